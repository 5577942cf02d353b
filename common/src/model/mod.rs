pub mod document_type;
pub mod template;
pub mod user;
pub mod user_document;
