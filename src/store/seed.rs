use crate::models::{Status, Technology};

/// The built-in collection used on first run and after a reset.
pub fn seed_technologies() -> Vec<Technology> {
    vec![
        seed(1, "React Components", "Learning the basic building blocks of React", "frontend"),
        seed(2, "JSX Syntax", "JSX syntax and how it compiles to JavaScript", "frontend"),
        seed(3, "State & Props", "Managing state and passing props", "frontend"),
        seed(4, "Node.js Basics", "Fundamentals of server-side JavaScript", "backend"),
        seed(5, "Express.js", "A framework for building HTTP servers", "backend"),
        Technology {
            status: Status::Completed,
            notes: "Completed during practice".to_string(),
            ..seed(6, "MongoDB", "A NoSQL document database", "database")
        },
    ]
}

fn seed(id: u64, title: &str, description: &str, category: &str) -> Technology {
    Technology {
        id,
        title: title.to_string(),
        description: description.to_string(),
        status: Status::NotStarted,
        notes: String::new(),
        deadline: None,
        resources: Vec::new(),
        category: Some(category.to_string()),
    }
}
