// Error types for the trellis container

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Definition not found: {0}")]
    DefinitionNotFound(String),

    #[error("Definition already registered: {0}")]
    DuplicateDefinition(String),

    #[error("Type mismatch: {0}")]
    TypeMismatch(String),

    #[error("Instance creation failed: {0}")]
    InstanceCreation(String),

    #[error("Scope not declared: {0}")]
    ScopeNotDeclared(String),

    #[error("Scope already created: {0}")]
    ScopeAlreadyCreated(String),

    #[error("Scope not found: {0}")]
    ScopeNotFound(String),

    #[error("Scope required to resolve {0}")]
    ScopeRequired(String),

    #[error("Scope mismatch: {0}")]
    ScopeMismatch(String),

    #[error("Scope closed: {0}")]
    ScopeClosed(String),

    #[error("Scoped definition has no scope name: {0}")]
    MissingScopeName(String),

    #[error("Property not found: {0}")]
    PropertyNotFound(String),

    #[error("Property parse error: {0}")]
    PropertyParse(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Container context already started")]
    AlreadyStarted,

    #[error("Container context not started")]
    NotStarted,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
