pub mod file;
pub mod memory;
pub mod traits;

pub use file::FileSagaStore;
pub use memory::MemorySagaStore;
pub use traits::*;
