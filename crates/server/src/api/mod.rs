pub mod foods;
pub mod handlers;
pub mod live;
pub mod middleware;
pub mod routes;

pub use routes::create_router;
