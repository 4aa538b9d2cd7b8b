pub mod types;
pub mod error;
pub mod config;
pub mod script;
pub mod inventory;
pub mod lookup;
pub mod rules;
pub mod sandhi;
pub mod morphology;
pub mod confidence;
pub mod terminology;
pub mod feedback;
pub mod engine;
pub mod output;

pub use config::Config;
pub use engine::{AnalysisRequest, Analyzer, TermMapper};
pub use feedback::{Feedback, FeedbackChoice, FeedbackSink};
pub use inventory::RootInventory;
pub use lookup::{AttestedIndex, FallbackPolicy, FormLookup};
pub use rules::RuleSet;
pub use script::{normalize, NormalizedForm};
pub use types::{
    Analysis, AnalysisResult, Annotation, Candidate, Categories, Dialect, DictionaryEntry, Source,
};
