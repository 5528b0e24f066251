//! The bootcamp directory's collections: names, validation rules, relations.

use crate::collection::CollectionRules;
use crate::engine::Engine;
use crate::store::{MemoryStore, Relation};
use std::sync::Arc;

pub const BOOTCAMPS: &str = "bootcamps";
pub const COURSES: &str = "courses";
pub const REVIEWS: &str = "reviews";
pub const USERS: &str = "users";

/// Every collection, in seeding order (parents before children).
pub const ALL: [&str; 4] = [BOOTCAMPS, COURSES, REVIEWS, USERS];

#[must_use]
pub fn rules(collection: &str) -> CollectionRules {
    match collection {
        BOOTCAMPS => CollectionRules::default()
            .require("name", "Please add a name")
            .require("description", "Please add a description")
            .unique("name"),
        COURSES => CollectionRules::default()
            .require("title", "Please add a course title")
            .require("description", "Please add a description")
            .require("weeks", "Please add number of weeks")
            .require("tuition", "Please add a tuition cost")
            .require("minimumSkill", "Please add a minimum skill")
            .require("bootcamp", "Please add a bootcamp"),
        REVIEWS => CollectionRules::default()
            .require("title", "Please add a title for the review")
            .require("text", "Please add some text")
            .require("rating", "Please add a rating between 1 and 10")
            .require("bootcamp", "Please add a bootcamp"),
        USERS => CollectionRules::default()
            .require("name", "Please add a name")
            .require("email", "Please add an email")
            .require("password", "Please add a password")
            .unique("email"),
        _ => CollectionRules::default(),
    }
}

/// Create every collection with its rules. Existing collections are left as they are.
pub fn install(engine: &Engine) {
    for name in ALL {
        engine.create_collection_with_rules(name, rules(name));
    }
}

/// Singular display name used in not-found messages.
#[must_use]
pub fn label(collection: &str) -> &'static str {
    match collection {
        BOOTCAMPS => "Bootcamp",
        COURSES => "Course",
        REVIEWS => "Review",
        USERS => "User",
        _ => "Resource",
    }
}

#[must_use]
pub fn bootcamp_store(engine: Arc<Engine>) -> MemoryStore {
    MemoryStore::new(engine, BOOTCAMPS)
        .with_relation("courses", Relation::has_many(COURSES, "bootcamp"))
        .with_relation("reviews", Relation::has_many(REVIEWS, "bootcamp"))
}

#[must_use]
pub fn course_store(engine: Arc<Engine>) -> MemoryStore {
    MemoryStore::new(engine, COURSES).with_relation("bootcamp", Relation::belongs_to(BOOTCAMPS))
}

#[must_use]
pub fn review_store(engine: Arc<Engine>) -> MemoryStore {
    MemoryStore::new(engine, REVIEWS)
        .with_relation("bootcamp", Relation::belongs_to(BOOTCAMPS))
        .with_relation("user", Relation::belongs_to(USERS))
}
