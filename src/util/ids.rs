use uuid::Uuid;

use crate::model::document::Document;

/// Length of generated ids (hex chars)
pub const ID_LEN: usize = 10;

/// A random id not used by any list or task in `doc` and not in `reserved`
/// (ids that may come back, such as a task waiting in the undo slot).
pub fn fresh_id(doc: &Document, reserved: &[&str]) -> String {
    mint(doc, reserved, random_id)
}

fn mint(doc: &Document, reserved: &[&str], mut next: impl FnMut() -> String) -> String {
    loop {
        let id = next();
        if !doc.contains_id(&id) && !reserved.contains(&id.as_str()) {
            return id;
        }
    }
}

fn random_id() -> String {
    let mut id = Uuid::new_v4().simple().to_string();
    id.truncate(ID_LEN);
    id
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::list::List;
    use std::collections::HashSet;

    #[test]
    fn ids_are_short_hex() {
        let id = fresh_id(&Document::default(), &[]);
        assert_eq!(id.len(), ID_LEN);
        assert!(id.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn ids_do_not_repeat() {
        let doc = Document::default();
        let ids: HashSet<String> = (0..500).map(|_| fresh_id(&doc, &[])).collect();
        assert_eq!(ids.len(), 500);
    }

    #[test]
    fn skips_used_and_reserved_ids() {
        let mut doc = Document::default();
        doc.lists.push(List::new("bbbbbbbbbb".into(), "A".into()));
        let mut candidates = ["aaaaaaaaaa", "bbbbbbbbbb", "cccccccccc"].into_iter();
        let id = mint(&doc, &["aaaaaaaaaa"], || {
            candidates.next().unwrap().to_string()
        });
        assert_eq!(id, "cccccccccc");
    }
}
