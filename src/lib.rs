pub mod config;
pub mod exception;
pub mod form;
pub mod handlers;
pub mod param;
pub mod reader;
pub mod request;
pub mod response;
pub mod router;
pub mod scanner;
pub mod server;

pub use config::Config;
pub use exception::Exception;
pub use handlers::{NotFoundHandler, StaticFileHandler, TemplateHandler};
pub use param::HttpRequestMethod;
pub use request::Request;
pub use response::Response;
pub use router::{Handler, Output, RouteTable};
pub use server::{dispatch, Server, WorkerPool};
