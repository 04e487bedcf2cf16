// src/domain/mod.rs
pub mod consent_audit_model;
pub mod consent_model;
pub mod consent_scope;
pub mod health_document_model;
