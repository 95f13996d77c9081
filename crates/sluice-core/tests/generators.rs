#![allow(dead_code)]

use proptest::prelude::*;
use sluice_core::model::{
    Category, ComplaintInput, ContactDetails, Coordinates, Location, Severity, Status,
};

pub fn arb_status() -> impl Strategy<Value = Status> {
    prop::sample::select(Status::ORDER.to_vec())
}

pub fn arb_category() -> impl Strategy<Value = Category> {
    prop::sample::select(Category::ALL.to_vec())
}

pub fn arb_severity() -> impl Strategy<Value = Severity> {
    prop::sample::select(Severity::ALL.to_vec())
}

pub fn arb_location() -> impl Strategy<Value = Location> {
    (
        prop::option::of("[A-Za-z0-9 ,.]{1,40}"),
        prop::option::of((-90.0f64..90.0, -180.0f64..180.0)),
    )
        .prop_map(|(address, coords)| {
            Location::new(
                address,
                coords.map(|(latitude, longitude)| Coordinates {
                    latitude,
                    longitude,
                }),
            )
        })
}

pub fn arb_input() -> impl Strategy<Value = ComplaintInput> {
    (
        "[A-Za-z ]{1,40}",
        "[A-Za-z0-9 .,!?]{1,120}",
        arb_category(),
        arb_severity(),
        arb_location(),
        prop::collection::vec("https://img\\.example\\.org/[a-z0-9]{4,12}\\.jpg", 0..4),
        ("[A-Za-z ]{1,20}", "[a-z]{1,8}@[a-z]{1,8}\\.org", "\\+[0-9]{7,12}"),
    )
        .prop_map(
            |(title, description, category, severity, location, images, (name, email, phone))| {
                ComplaintInput {
                    title,
                    description,
                    category,
                    severity,
                    location,
                    images,
                    contact_details: ContactDetails { name, email, phone },
                }
            },
        )
}

/// A fixed, fully-populated input for example-based tests.
pub fn leak_report() -> ComplaintInput {
    ComplaintInput {
        title: "Burst main on Harbour Rd".to_string(),
        description: "Water gushing from the pavement near the bus stop".to_string(),
        category: Category::Leak,
        severity: Severity::Critical,
        location: Location::new(Some("14 Harbour Rd".to_string()), None),
        images: Vec::new(),
        contact_details: ContactDetails {
            name: "Rowan Ellis".to_string(),
            email: "rowan@example.org".to_string(),
            phone: "+15550142".to_string(),
        },
    }
}
