use regexp2::{Ast, NameResolver};

/// The regular-definition table: name -> AST, latest-wins shadowing. A
/// reference only ever sees definitions already inserted when it's looked
/// up ("resolution uses the table at the moment the rule is parsed"), so a
/// definition can never observe itself or a later one -- the occurs-check
/// against cyclic reference is structurally satisfied rather than checked.
#[derive(Default)]
pub struct Definitions {
    entries: Vec<(String, Ast)>,
}

impl Definitions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: String, ast: Ast) {
        self.entries.push((name, ast));
    }
}

impl NameResolver for Definitions {
    fn resolve(&self, name: &str) -> Option<Ast> {
        self.entries
            .iter()
            .rev()
            .find(|(n, _)| n == name)
            .map(|(_, ast)| ast.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use regexp2::CharClass;

    #[test]
    fn later_definition_shadows_earlier_one() {
        let mut defs = Definitions::new();
        defs.insert("X".to_string(), Ast::Class(CharClass::new_single(b'a')));
        defs.insert("X".to_string(), Ast::Class(CharClass::new_single(b'b')));
        assert_eq!(
            defs.resolve("X"),
            Some(Ast::Class(CharClass::new_single(b'b')))
        );
    }

    #[test]
    fn unknown_name_does_not_resolve() {
        let defs = Definitions::new();
        assert_eq!(defs.resolve("X"), None);
    }
}
