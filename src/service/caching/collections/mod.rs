pub mod documents;
pub mod users;

pub use documents::{append_documents, document_count, DocumentStoreError};
pub use users::{authenticate_user, hash_password, register_user, verify_password, AuthError};
