use std::collections::{BTreeMap, HashMap};

use serde::Serialize;

use crate::entity::{Attributes, Entity, ErrorMap};
use crate::error::ValidatorError;

/// Identifier to error ledger, for the entities of one type that have errors.
pub type TypeErrors = BTreeMap<String, ErrorMap>;

/// Entity type to [`TypeErrors`], omitting types without errors.
pub type SubmissionErrors = BTreeMap<String, TypeErrors>;

#[derive(Debug, Clone, Serialize)]
struct EntityGroup {
    entity_type: String,
    entities: Vec<Entity>,
    #[serde(skip)]
    positions: HashMap<String, usize>,
}

impl EntityGroup {
    fn new(entity_type: &str) -> Self {
        Self {
            entity_type: entity_type.to_string(),
            entities: Vec::new(),
            positions: HashMap::new(),
        }
    }
}

/// The batch of entities validated together, keyed by `(type, identifier)`.
///
/// Types and the entities within a type keep the order in which they were
/// first registered.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Submission {
    groups: Vec<EntityGroup>,
    #[serde(skip)]
    group_positions: HashMap<String, usize>,
}

impl Submission {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers the entity, replacing any previous one under the same key in place.
    pub fn map(
        &mut self,
        entity_type: &str,
        identifier: &str,
        attributes: Attributes,
    ) -> &mut Entity {
        let entity = Entity::new(entity_type, identifier, attributes);
        let index = match self.group_positions.get(entity_type) {
            Some(&index) => index,
            None => {
                self.groups.push(EntityGroup::new(entity_type));
                let index = self.groups.len() - 1;
                self.group_positions.insert(entity_type.to_string(), index);
                index
            }
        };
        let group = &mut self.groups[index];
        let position = match group.positions.get(identifier) {
            Some(&position) => {
                group.entities[position] = entity;
                position
            }
            None => {
                group.entities.push(entity);
                let position = group.entities.len() - 1;
                group.positions.insert(identifier.to_string(), position);
                position
            }
        };
        &mut group.entities[position]
    }

    pub fn get_entity(&self, entity_type: &str, identifier: &str) -> Result<&Entity, ValidatorError> {
        self.group(entity_type)
            .and_then(|group| {
                group
                    .positions
                    .get(identifier)
                    .map(|&position| &group.entities[position])
            })
            .ok_or_else(|| not_found(entity_type, identifier))
    }

    pub fn get_entity_mut(
        &mut self,
        entity_type: &str,
        identifier: &str,
    ) -> Result<&mut Entity, ValidatorError> {
        let position = self
            .group(entity_type)
            .and_then(|group| group.positions.get(identifier).copied());
        match (self.group_positions.get(entity_type), position) {
            (Some(&index), Some(position)) => Ok(&mut self.groups[index].entities[position]),
            _ => Err(not_found(entity_type, identifier)),
        }
    }

    fn group(&self, entity_type: &str) -> Option<&EntityGroup> {
        self.group_positions
            .get(entity_type)
            .map(|&index| &self.groups[index])
    }

    pub fn entity_types(&self) -> impl Iterator<Item = &str> {
        self.groups.iter().map(|group| group.entity_type.as_str())
    }

    pub fn entities(&self, entity_type: &str) -> &[Entity] {
        self.group(entity_type)
            .map(|group| group.entities.as_slice())
            .unwrap_or(&[])
    }

    pub fn entities_mut(&mut self, entity_type: &str) -> &mut [Entity] {
        match self.group_positions.get(entity_type) {
            Some(&index) => self.groups[index].entities.as_mut_slice(),
            None => &mut [],
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Entity> {
        self.groups.iter().flat_map(|group| group.entities.iter())
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Entity> {
        self.groups
            .iter_mut()
            .flat_map(|group| group.entities.iter_mut())
    }

    pub fn len(&self) -> usize {
        self.groups.iter().map(|group| group.entities.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn has_errors(&self) -> bool {
        self.iter().any(Entity::has_errors)
    }

    pub fn get_errors(&self, entity_type: &str) -> TypeErrors {
        self.entities(entity_type)
            .iter()
            .filter(|entity| entity.has_errors())
            .map(|entity| (entity.identifier().to_string(), entity.get_errors().clone()))
            .collect()
    }

    pub fn get_all_errors(&self) -> SubmissionErrors {
        let mut all = SubmissionErrors::new();
        for entity_type in self.entity_types() {
            let errors = self.get_errors(entity_type);
            if !errors.is_empty() {
                all.insert(entity_type.to_string(), errors);
            }
        }
        all
    }
}

fn not_found(entity_type: &str, identifier: &str) -> ValidatorError {
    ValidatorError::EntityNotFound {
        entity_type: entity_type.to_string(),
        identifier: identifier.to_string(),
    }
}
