//! Host types with hand-written mappings to and from the wire.

use lazypack::{Document, Encode, Result, ValueEncoder};

#[derive(Debug, Clone, PartialEq)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Circle {
    pub center: Position,
    pub radius: f64,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Graph {
    pub name: String,
    pub nodes: u16,
    pub root: Circle,
    pub weight: Option<f32>,
}

impl Encode for Position {
    fn encode(&self, encoder: &mut ValueEncoder) -> Result<()> {
        encoder.map(|map| {
            map.field("x", &self.x)?.field("y", &self.y)?;
            Ok(())
        })
    }
}

impl Encode for Circle {
    fn encode(&self, encoder: &mut ValueEncoder) -> Result<()> {
        encoder.map(|map| {
            map.field("center", &self.center)?
                .field("radius", &self.radius)?
                .field("label", &self.label)?;
            Ok(())
        })
    }
}

impl Encode for Graph {
    fn encode(&self, encoder: &mut ValueEncoder) -> Result<()> {
        encoder.map(|map| {
            map.field("name", &self.name)?
                .field("nodes", &self.nodes)?
                .field("root", &self.root)?
                .field("weight", &self.weight)?;
            Ok(())
        })
    }
}

pub fn decode_position(doc: &Document<'_>) -> Result<Position> {
    Ok(Position {
        x: doc.decode_field("x")?,
        y: doc.decode_field("y")?,
    })
}

pub fn decode_circle(doc: &Document<'_>) -> Result<Circle> {
    Ok(Circle {
        center: decode_position(&doc.nested("center")?)?,
        radius: doc.decode_field("radius")?,
        label: doc.decode_field("label")?,
    })
}

pub fn decode_graph(doc: &Document<'_>) -> Result<Graph> {
    Ok(Graph {
        name: doc.decode_field("name")?,
        nodes: doc.decode_field("nodes")?,
        root: decode_circle(&doc.nested("root")?)?,
        weight: doc.decode_field_if_present("weight")?,
    })
}

pub fn sample_position() -> Position {
    Position { x: 3, y: -4 }
}

pub fn sample_circle() -> Circle {
    Circle {
        center: sample_position(),
        radius: 2.5,
        label: "unit".to_string(),
    }
}

pub fn sample_graph() -> Graph {
    Graph {
        name: "g".to_string(),
        nodes: 300,
        root: sample_circle(),
        weight: None,
    }
}
