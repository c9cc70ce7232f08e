pub mod aggregate;
pub mod config;
pub mod error;
pub mod gather;
pub mod generate;
pub mod keywords;
pub mod step;
pub mod steps;

pub use aggregate::aggregate_sql_files;
pub use config::{
    Config, NO_POLYMORPHIC_OUTPUT_FILENAME, OutputTarget, PRIMARY_OUTPUT_FILENAME,
};
pub use error::{AppError, Result};
pub use gather::{SourceFile, list_sql_files};
pub use generate::{
    GenerationOptions, GenerationPlan, GenerationReport, Generator, OutputKind, OutputSummary,
};
pub use keywords::{KeywordSet, POLYMORPHIC_KEYWORDS};
pub use step::extract_step_number;
pub use steps::{StepSet, parse_steps_expr};
