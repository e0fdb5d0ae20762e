mod session;

pub use session::{FilePart, UploadSession};
