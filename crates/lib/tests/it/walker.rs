//! Custom visitors over the public walker API.

use blueprint::{
    Address, Result, Value,
    walker::{KeyAction, TreeWalker, Visitor},
};

use crate::helpers::{doc, get, keys_at};

/// Upper-cases keys, drops `tmp_` keys and doubles integers.
#[derive(Default)]
struct Normalizer {
    exited: Vec<String>,
}

impl Visitor for Normalizer {
    fn on_key_enter(
        &mut self,
        _tree: &mut Value,
        key: &str,
        _address: &Address,
    ) -> Result<KeyAction> {
        if key.starts_with("tmp_") {
            return Ok(KeyAction::Delete);
        }
        Ok(KeyAction::Keep(key.to_uppercase()))
    }

    fn on_key_exit(&mut self, _tree: &mut Value, key: &str, address: &Address) -> Result<()> {
        assert_eq!(address.last_key(), Some(key));
        self.exited.push(key.to_string());
        Ok(())
    }

    fn on_leaf(&mut self, tree: &mut Value, address: &Address) -> Result<bool> {
        if let Value::Int(n) = tree.read(address)? {
            let doubled = n * 2;
            tree.write(address, doubled)?;
        }
        Ok(false)
    }
}

#[test]
fn test_custom_visitor() {
    let mut tree = doc(r#"{"a": {"tmp_x": 1, "b": 2}, "list": [1, {"c": 3}], "tmp_y": 0}"#);
    let mut visitor = Normalizer::default();
    TreeWalker::default().walk(&mut tree, &mut visitor).unwrap();

    assert_eq!(keys_at(&tree, &[]), vec!["A", "LIST"]);
    assert_eq!(keys_at(&tree, &["A"]), vec!["B"]);
    assert_eq!(get(&tree, &["A", "B"]), &Value::Int(4));
    assert_eq!(
        tree.read(&Address::root().key("LIST").index(1).key("C"))
            .unwrap(),
        &Value::Int(6)
    );
    assert_eq!(visitor.exited, vec!["B", "A", "C", "LIST"]);
}

#[test]
fn test_walk_at_subtree() {
    let mut tree = doc(r#"{"skip": {"x": 1}, "only": {"y": 1}}"#);
    let mut visitor = Normalizer::default();
    TreeWalker::default()
        .walk_at(&mut tree, &mut visitor, &Address::from_keys(["only"]))
        .unwrap();
    assert_eq!(get(&tree, &["skip", "x"]), &Value::Int(1));
    assert_eq!(get(&tree, &["only", "Y"]), &Value::Int(2));
}
