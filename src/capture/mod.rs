mod collect;
mod parse;
mod record;

pub use collect::{CaptureSource, DirectorySource};
pub use parse::hop_address;
pub use record::{Capture, HopRecord, SUCCESS_STATUS};
