//! # Uglify Parallel Library
//!
//! Questo è il modulo principale della libreria che espone tutte le API pubbliche.
//!
//! ## Responsabilità:
//! - Definisce la struttura modulare dell'applicazione
//! - Espone i tipi e le funzioni principali tramite re-exports
//! - Fornisce un'interfaccia pulita per il main.rs e per altri consumatori
//!
//! ## Architettura dei moduli:
//! - `config`: Opzioni di minificazione, normalizzazione e validazione
//! - `error`: Errori fatali e esito dei singoli job
//! - `job`: Job, manifest e discovery da directory
//! - `minifier`: Trait `Minifier` e implementazione basata su CLI
//! - `tool_resolver`: Ricerca dell'eseguibile del minifier
//! - `assembler`: Scrittura di output, source map e report dimensioni
//! - `file_manager`: Operazioni sui file
//! - `parallel`: Partizionamento, worker e coordinamento del completamento
//! - `progress` / `json_output`: Feedback all'utente
//!
//! ## Utilizzo:
//! ```ignore
//! use std::sync::Arc;
//! use uglify_parallel::{CommandMinifier, Config, Coordinator, Job};
//!
//! let minifier = CommandMinifier::check_dependencies(None)?;
//! let coordinator = Coordinator::new(Config::default(), Arc::new(minifier))?;
//! let jobs = vec![Job::new(["src/a.js", "src/b.js"], "dist/ab.min.js")];
//! coordinator.run(jobs, || {}).await?;
//! ```

pub mod assembler;
pub mod config;
pub mod error;
pub mod file_manager;
pub mod job;
pub mod json_output;
pub mod minifier;
pub mod parallel;
pub mod progress;
pub mod tool_resolver;

pub use assembler::{ArtifactAssembler, ArtifactReport};
pub use config::{Config, NameHook, ReportMode};
pub use error::{JobOutcome, MinifyError};
pub use job::{Job, JobOptions};
pub use minifier::{CommandMinifier, Minifier, MinifierDiagnostic, MinifyOptions, MinifyOutput, SizeStats};
pub use parallel::{Coordinator, RunSummary};
