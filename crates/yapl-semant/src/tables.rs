use crate::types::{InferredType, Scope, TypeName};
use std::collections::HashMap;
use yapl_ast::{ClassDecl, Feature, Item, Program};

/// Declared types of the attributes and methods of one scope.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AttributeTable {
    entries: HashMap<String, TypeName>,
}

impl AttributeTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Later declarations replace earlier ones. The replaced type is returned.
    pub fn insert(&mut self, name: impl Into<String>, ty: TypeName) -> Option<TypeName> {
        self.entries.insert(name.into(), ty)
    }

    pub fn get(&self, name: &str) -> Option<&TypeName> {
        self.entries.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Entries ordered by name.
    pub fn sorted(&self) -> Vec<(&str, &TypeName)> {
        let mut entries: Vec<_> = self.entries.iter().map(|(name, ty)| (name.as_str(), ty)).collect();
        entries.sort_by(|a, b| a.0.cmp(b.0));
        entries
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClassTable {
    classes: HashMap<String, AttributeTable>,
}

impl ClassTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `name` with an empty table, replacing any earlier one.
    pub fn register(&mut self, name: impl Into<String>) {
        self.classes.insert(name.into(), AttributeTable::new());
    }

    pub fn get(&self, name: &str) -> Option<&AttributeTable> {
        self.classes.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.classes.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    pub fn sorted(&self) -> Vec<(&str, &AttributeTable)> {
        let mut classes: Vec<_> = self.classes.iter().map(|(name, table)| (name.as_str(), table)).collect();
        classes.sort_by(|a, b| a.0.cmp(b.0));
        classes
    }

    fn entry(&mut self, name: &str) -> &mut AttributeTable {
        self.classes.entry(name.to_string()).or_default()
    }
}

/// The class table plus the table for declarations outside any class.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SymbolTables {
    pub classes: ClassTable,
    pub top_level: AttributeTable,
}

impl SymbolTables {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn enter_class(&mut self, name: &str) -> Scope {
        if self.classes.contains(name) {
            log::debug!("class '{}' declared again; its attribute table starts over", name);
        }
        self.classes.register(name);
        Scope::Class(name.to_string())
    }

    pub fn declare(&mut self, scope: &Scope, name: &str, ty: TypeName) -> Option<TypeName> {
        let table = match scope {
            Scope::TopLevel => &mut self.top_level,
            Scope::Class(class) => self.classes.entry(class),
        };

        let previous = table.insert(name, ty);
        if let Some(previous) = &previous {
            log::debug!("'{}' redeclared in {}; replacing type '{}'", name, scope, previous);
        }
        previous
    }

    pub fn lookup(&self, scope: &Scope, name: &str) -> InferredType {
        self.table(scope)
            .and_then(|table| table.get(name))
            .cloned()
            .into()
    }

    pub fn table(&self, scope: &Scope) -> Option<&AttributeTable> {
        match scope {
            Scope::TopLevel => Some(&self.top_level),
            Scope::Class(class) => self.classes.get(class),
        }
    }
}

/// Builds the complete tables for a program without checking any expression.
pub struct SymbolTableBuilder {
    tables: SymbolTables,
}

impl SymbolTableBuilder {
    pub fn build(program: &Program) -> SymbolTables {
        let mut builder = Self {
            tables: SymbolTables::new(),
        };

        for item in &program.items {
            match item {
                Item::Class(class) => builder.visit_class(class),
                Item::Feature(feature) => builder.visit_feature(&Scope::TopLevel, feature),
                Item::Error(_) => {}
            }
        }

        builder.tables
    }

    fn visit_class(&mut self, class: &ClassDecl) {
        let scope = self.tables.enter_class(&class.name.name);
        for feature in &class.features {
            self.visit_feature(&scope, feature);
        }
    }

    fn visit_feature(&mut self, scope: &Scope, feature: &Feature) {
        if let Some((name, ty)) = feature.declaration() {
            self.tables.declare(scope, &name.name, TypeName::new(ty.name.as_str()));
        }
    }
}
