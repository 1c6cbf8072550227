pub mod prepare_use_case;

pub use self::prepare_use_case::{Prepared, PrepareUseCase, TableSink};
