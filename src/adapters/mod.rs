pub mod crm;
pub mod mailer;
pub mod memory;

pub use crm::CrmClient;
pub use mailer::TemplateMailer;
pub use memory::InMemoryPlatform;
