pub mod complaint;

pub use complaint::{
    Category, Complaint, ComplaintInput, ContactDetails, Coordinates, Location, ParseEnumError,
    Severity, Status, reference,
};
