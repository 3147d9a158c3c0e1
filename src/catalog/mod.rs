mod standard;

use std::collections::HashMap;

use crate::model::{BlockCategory, BlockTemplate};

/// Read-only registry of block templates.
///
/// Built once and passed by reference to everything that needs to look up
/// a block type. Nothing mutates a catalog after construction, so a single
/// instance can be shared freely across threads and runs.
#[derive(Debug, Clone)]
pub struct Catalog {
    templates: Vec<BlockTemplate>,
    index: HashMap<String, usize>,
}

impl Catalog {
    /// Build a catalog from templates. A later template with the same type
    /// id shadows an earlier one.
    pub fn from_templates(templates: Vec<BlockTemplate>) -> Self {
        let mut kept: Vec<BlockTemplate> = Vec::with_capacity(templates.len());
        let mut index = HashMap::new();
        for template in templates {
            match index.get(&template.block_type) {
                Some(&i) => kept[i] = template,
                None => {
                    index.insert(template.block_type.clone(), kept.len());
                    kept.push(template);
                }
            }
        }
        Self {
            templates: kept,
            index,
        }
    }

    /// The built-in block set.
    pub fn standard() -> Self {
        Self::from_templates(standard::templates())
    }

    pub fn template(&self, block_type: &str) -> Option<&BlockTemplate> {
        self.index.get(block_type).map(|&i| &self.templates[i])
    }

    pub fn contains(&self, block_type: &str) -> bool {
        self.index.contains_key(block_type)
    }

    /// Templates in registration order.
    pub fn templates(&self) -> &[BlockTemplate] {
        &self.templates
    }

    pub fn by_category(&self, category: BlockCategory) -> impl Iterator<Item = &BlockTemplate> {
        self.templates.iter().filter(move |t| t.category == category)
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::standard()
    }
}
