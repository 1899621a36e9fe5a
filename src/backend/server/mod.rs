//! Server Module
//!
//! This module contains the code that initializes and configures the Axum
//! HTTP server.
//!
//! # Architecture
//!
//! - **`state`** - Application state structure and `FromRef` implementations
//! - **`config`** - Opening the store from configuration
//! - **`init`** - App creation
//! - **`health`** - Liveness endpoint
//!
//! # Module Structure
//!
//! ```text
//! server/
//! ├── mod.rs          - Module exports and documentation
//! ├── state.rs        - AppState and FromRef implementations
//! ├── config.rs       - Store loading
//! ├── init.rs         - App creation
//! └── health.rs       - GET /health
//! ```
//!
//! # Initialization Flow
//!
//! 1. **Configuration Loading**: `AppConfig::from_env`
//! 2. **Store**: `load_database`, `None` if unset or unreachable
//! 3. **Router Creation**: `create_app`
//! 4. **Shutdown**: `AppState::shutdown` closes the store after the server stops
//!
//! # Example
//!
//! ```rust,no_run
//! use syllabus::backend::server::{config::load_database, create_app, AppState};
//! use syllabus::shared::AppConfig;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = AppConfig::from_env()?;
//! let state = AppState::new(load_database(&config).await);
//! let app = create_app(state, &config);
//! # Ok(())
//! # }
//! ```

/// Application state management
pub mod state;

/// Server configuration loading
pub mod config;

/// Server initialization
pub mod init;

/// Health endpoint
pub mod health;

// Re-export commonly used types
pub use init::create_app;
pub use state::AppState;
