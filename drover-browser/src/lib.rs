//! Navigation-and-extraction engine for agent-driven browsing.
//!
//! This crate wraps a WebDriver session behind a single [`session::Session`]
//! handle and layers the heuristics an automated agent needs on top of it:
//! challenge-aware navigation, readable-text extraction, link sanitisation,
//! form-input discovery, and best-guess form submission.
//!
//! - [`driver`]: capabilities assembly and chromedriver connection
//! - [`session::Session`]: the live page handle and navigation controller
//! - [`extract`]: page markup to filtered Markdown
//! - [`sanitize`]: URL cleaning and navigability checks
//! - [`inspect`]: input and button enumeration
//! - [`forms`]: fill-command parsing and heuristic submission
pub mod driver;
pub mod extract;
mod fault;
pub mod forms;
pub mod inspect;
pub mod sanitize;
mod scripts;
pub mod session;

pub use driver::connect;
pub use forms::FillCommand;
pub use inspect::{ButtonCandidate, InputDescriptor, InputKind};
pub use session::{Link, Session};
