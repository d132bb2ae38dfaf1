pub mod routes;
pub mod server;
pub mod state;

pub use routes::{DetectionResponse, IMAGE_FIELD};
pub use server::{router, Server};
pub use state::AppState;
