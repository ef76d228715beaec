pub mod model;
pub mod ports;

pub use model::{
    CourseEnrollmentRecord, EnrollmentAttempt, EnrollmentKind, ExceptionReport,
    NotificationResult, Program, RosterRecord, StatusPurpose, UserAccount,
};
pub use ports::{Mailer, Platform, RosterSource};
