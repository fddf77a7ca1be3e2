//! Minimal replicated types for end to end testing

use std::sync::Arc;

use naia_replica_shared::{
    tracker_of, ChangeTracker, ClassSchema, Data, Replicate, SchemaCell, TrackerCell, Value,
};

pub struct Position {
    x: i64,
    y: i64,
    cell: TrackerCell,
}

impl Position {
    pub fn new(x: i64, y: i64) -> Self {
        Self {
            x,
            y,
            cell: TrackerCell::new(),
        }
    }

    pub fn tracker(&self) -> ChangeTracker {
        tracker_of(self)
    }

    pub fn set_x(&self, x: i64) {
        self.tracker().set("x", x);
    }

    pub fn set_y(&self, y: i64) {
        self.tracker().set("y", y);
    }
}

impl Replicate for Position {
    fn schema(&self) -> Arc<ClassSchema> {
        static SCHEMA: SchemaCell = SchemaCell::new();
        SCHEMA.get_or_build(|| {
            ClassSchema::builder("Position")
                .field("x", 0)
                .field("y", 0)
                .track_all(Vec::<String>::new())
                .build()
        })
    }

    fn tracker_cell(&self) -> &TrackerCell {
        &self.cell
    }

    fn raw_values(&self) -> Vec<(&'static str, Data)> {
        vec![("x", Data::from(self.x)), ("y", Data::from(self.y))]
    }
}

pub struct Unit {
    hp: i64,
    name: String,
    pos: Position,
    cell: TrackerCell,
}

impl Unit {
    pub fn new(hp: i64, name: &str, pos: Position) -> Self {
        Self {
            hp,
            name: name.to_string(),
            pos,
            cell: TrackerCell::new(),
        }
    }

    pub fn tracker(&self) -> ChangeTracker {
        tracker_of(self)
    }

    pub fn pos(&self) -> &Position {
        &self.pos
    }

    pub fn set_hp(&self, hp: i64) {
        self.tracker().set("hp", hp);
    }

    pub fn set_name(&self, name: &str) {
        self.tracker().set("name", name);
    }
}

impl Default for Unit {
    fn default() -> Self {
        Self::new(100, "grunt", Position::new(0, 0))
    }
}

impl Replicate for Unit {
    fn schema(&self) -> Arc<ClassSchema> {
        static SCHEMA: SchemaCell = SchemaCell::new();
        SCHEMA.get_or_build(|| {
            ClassSchema::builder("Unit")
                .field("hp", 100)
                .field("name", "grunt")
                .field("pos", Value::Null)
                .track_all(Vec::<String>::new())
                .build()
        })
    }

    fn tracker_cell(&self) -> &TrackerCell {
        &self.cell
    }

    fn raw_values(&self) -> Vec<(&'static str, Data)> {
        vec![
            ("hp", Data::from(self.hp)),
            ("name", Data::from(self.name.as_str())),
            ("pos", Data::from(self.pos.tracker())),
        ]
    }
}
