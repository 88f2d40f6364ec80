mod backend;
mod backends;
mod registry;
mod result;

pub use backend::FaceDetectorBackend;
pub use backends::StubBackend;
pub use registry::BackendRegistry;
pub use result::FaceRect;
