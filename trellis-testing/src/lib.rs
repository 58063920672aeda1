//! Testing utilities for trellis containers.
//!
//! The centerpiece is the sandboxed wiring check: it validates that every
//! registered definition can be resolved, without invoking a single real
//! constructor. Around it sit the usual test helpers: declares, mocks and
//! assertions.
//!
//! ## Features
//!
//! - **CheckModules** - sandboxed wiring check for whole containers
//! - **SandboxInstance** - placeholder instance holder
//! - **declare** - slide pre-built test doubles under the graph
//! - **MockService** - call-recording service mock
//! - **TestContainer** - container wrapper with test shortcuts
//! - **Assertions** - panicking helpers for container state
//!
//! ## Quick Start
//!
//! ```
//! use trellis_core::{single, AppBuilder, Module};
//! use trellis_testing::CheckModules;
//!
//! struct Database;
//! struct UserService { _database: std::sync::Arc<Database> }
//!
//! let app = AppBuilder::new()
//!     .module(
//!         Module::new("app")
//!             .provide(single(|_| Ok(Database)).build())
//!             .provide(
//!                 single(|ctx| Ok(UserService { _database: ctx.get::<Database>()? })).build(),
//!             ),
//!     )
//!     .build()
//!     .unwrap();
//!
//! // resolves every definition against placeholders; no Database is built
//! app.check_modules().unwrap();
//! ```
//!
//! ## Test Doubles
//!
//! ```
//! use trellis_core::Container;
//! use trellis_testing::{declare, MockService};
//!
//! let container = Container::new();
//! let mock = MockService::<String>::new().with_return("pong".to_string());
//! declare(&container, mock.clone()).unwrap();
//!
//! let service = container.get::<MockService<String>>().unwrap();
//! service.record_call("ping");
//! assert!(mock.was_called("ping"));
//! ```

mod assertions;
mod check;
mod declare;
mod mock;
mod sandbox;
mod test_container;

pub use assertions::{
    assert_checks, assert_definition_count, assert_not_registered, assert_resolves,
};
pub use check::{check_modules, CheckError, CheckModules};
pub use declare::{declare, declare_named};
pub use mock::MockService;
pub use sandbox::{SandboxInstance, Sandboxed};
pub use test_container::TestContainer;
