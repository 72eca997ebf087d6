//! Query text generated from entity metadata.

use std::collections::HashSet;

use crate::models::Entity;

/// Row limit of generated select statements.
pub const SELECT_LIMIT: usize = 1000;

/// `SELECT TOP 1000 a, b\nFROM Full.Name\n` over the non-navigable properties, in
/// declaration order with duplicates dropped.
pub fn select_statement(entity: &Entity, include_inherited: bool) -> String {
    let mut seen = HashSet::new();
    let columns: Vec<&str> = entity
        .properties
        .iter()
        .filter(|property| !property.is_navigable)
        .filter(|property| include_inherited || !property.is_inherited)
        .map(|property| property.name.as_str())
        .filter(|name| seen.insert(*name))
        .collect();

    format!("SELECT TOP {SELECT_LIMIT} {}\nFROM {}\n", columns.join(", "), entity.full_name)
}

pub fn subscribe_statement(entity: &Entity) -> String {
    if entity.is_indication {
        format!("SUBSCRIBE {}", entity.full_name)
    } else {
        format!("SUBSCRIBE CHANGES TO {}", entity.full_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Property;

    fn nodes() -> Entity {
        Entity::new("Orion.Nodes")
            .with_property(Property::new("NodeID", "Int32").key())
            .with_property(Property::new("Caption", "String"))
            .with_property(Property::new("Caption", "String"))
            .with_property(Property::new("Uri", "String").inherited())
            .with_property(Property::new("Interfaces", "Orion.Interfaces").navigable())
    }

    #[test]
    fn select_skips_navigable_and_duplicates() {
        assert_eq!(
            select_statement(&nodes(), false),
            "SELECT TOP 1000 NodeID, Caption\nFROM Orion.Nodes\n"
        );
        assert_eq!(
            select_statement(&nodes(), true),
            "SELECT TOP 1000 NodeID, Caption, Uri\nFROM Orion.Nodes\n"
        );
    }

    #[test]
    fn subscribe_depends_on_indication() {
        let mut entity = nodes();
        assert_eq!(subscribe_statement(&entity), "SUBSCRIBE CHANGES TO Orion.Nodes");
        entity.is_indication = true;
        assert_eq!(subscribe_statement(&entity), "SUBSCRIBE Orion.Nodes");
    }
}
