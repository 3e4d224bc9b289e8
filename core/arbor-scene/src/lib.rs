pub mod components;
pub mod systems;

use std::collections::HashMap;

use hecs::{Entity, World};

use arbor_protocol::{DiffFields, PrimitiveId, Token, TokenId};
use components::{ArcLevel, Column, DiffMarks, Labels, RenderedToken};

/// The rendered tokens of one render pass. Rebuilt from scratch on every re-render.
pub struct SceneWorld {
    world: World,
    order: Vec<Entity>,
    positions: HashMap<TokenId, usize>,
}

impl Default for SceneWorld {
    fn default() -> Self {
        Self::new()
    }
}

impl SceneWorld {
    pub fn new() -> Self {
        Self {
            world: World::new(),
            order: Vec::new(),
            positions: HashMap::new(),
        }
    }

    pub fn clear(&mut self) {
        self.world.clear();
        self.order.clear();
        self.positions.clear();
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Add the next token in render order. Its position is its index in that order.
    pub fn spawn_token(&mut self, token: Token, column: Column, level: u32, labels: Labels) -> Entity {
        let position = self.order.len();
        let id = token.id;
        let entity = self.world.spawn((
            RenderedToken { token },
            Column { position, ..column },
            ArcLevel(level),
            labels,
        ));
        self.order.push(entity);
        self.positions.insert(id, position);
        entity
    }

    pub fn entity_at(&self, position: usize) -> Option<Entity> {
        self.order.get(position).copied()
    }

    pub fn position_of(&self, id: &TokenId) -> Option<usize> {
        self.positions.get(id).copied()
    }

    /// Token ids in render order.
    pub fn ids(&self) -> Vec<TokenId> {
        self.order
            .iter()
            .filter_map(|e| self.world.get::<&RenderedToken>(*e).ok().map(|r| r.token.id))
            .collect()
    }

    pub fn token(&self, position: usize) -> Option<Token> {
        let entity = self.entity_at(position)?;
        self.world
            .get::<&RenderedToken>(entity)
            .ok()
            .map(|r| r.token.clone())
    }

    pub fn column(&self, position: usize) -> Option<Column> {
        let entity = self.entity_at(position)?;
        self.world.get::<&Column>(entity).ok().map(|c| *c)
    }

    pub fn level(&self, position: usize) -> Option<u32> {
        let entity = self.entity_at(position)?;
        self.world.get::<&ArcLevel>(entity).ok().map(|l| l.0)
    }

    pub fn label(&self, position: usize, key: &str) -> Option<PrimitiveId> {
        let entity = self.entity_at(position)?;
        self.world.get::<&Labels>(entity).ok().and_then(|l| l.get(key))
    }

    pub fn labels(&self, position: usize) -> Vec<(String, PrimitiveId)> {
        self.entity_at(position)
            .and_then(|e| self.world.get::<&Labels>(e).ok())
            .map(|l| l.primitives.iter().map(|(k, v)| (k.clone(), *v)).collect())
            .unwrap_or_default()
    }

    pub fn insert_label(&mut self, position: usize, key: impl Into<String>, id: PrimitiveId) {
        if let Some(entity) = self.entity_at(position) {
            if let Ok(mut labels) = self.world.get::<&mut Labels>(entity) {
                labels.primitives.insert(key.into(), id);
            }
        }
    }

    /// Every primitive owned by any rendered token.
    pub fn all_primitives(&self) -> Vec<PrimitiveId> {
        self.world
            .query::<&Labels>()
            .iter()
            .flat_map(|(_, labels)| labels.primitives.values().copied().collect::<Vec<_>>())
            .collect()
    }

    /// Which token, and which of its labels, a primitive belongs to.
    pub fn owner_of(&self, primitive: PrimitiveId) -> Option<(TokenId, String)> {
        for (_entity, (rendered, labels)) in self.world.query::<(&RenderedToken, &Labels)>().iter() {
            if let Some((key, _)) = labels.primitives.iter().find(|(_, id)| **id == primitive) {
                return Some((rendered.token.id, key.clone()));
            }
        }
        None
    }

    pub fn set_diff(&mut self, position: usize, fields: DiffFields) {
        if let Some(entity) = self.entity_at(position) {
            let _ = self.world.insert_one(entity, DiffMarks { fields });
        }
    }

    pub fn diff(&self, position: usize) -> DiffFields {
        self.entity_at(position)
            .and_then(|e| self.world.get::<&DiffMarks>(e).ok().map(|d| d.fields))
            .unwrap_or(DiffFields::empty())
    }
}
