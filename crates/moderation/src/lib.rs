mod analyzer;
mod openai;
mod pipeline;
mod policy;
mod rules;

pub use analyzer::{Analysis, AnalysisError, Analyzer, Category, Decision};
pub use openai::{OpenAiAnalyzer, OpenAiSettings};
pub use pipeline::screen;
pub use policy::decide;
pub use rules::{RuleAnalyzer, RuleTables};
