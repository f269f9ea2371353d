//! Turning a string ref into a callable one (§4.1 of `SPEC_FULL.md`).

use crate::child::ElementRef;
use crate::config::Config;
use crate::error::{Error, Result};
use crate::fiber::{Arena, Fiber, FiberId, RefCallback};

/// Resolves `ref_` to a callable form, binding a string ref against
/// `owner`'s refs map.
pub fn coerce_ref<C: Config>(
    arena: &Arena<C>,
    current: Option<&Fiber<C>>,
    ref_: Option<ElementRef<C>>,
    owner: Option<FiberId>,
) -> Result<Option<RefCallback<C>>> {
    let ref_ = match ref_ {
        None => return Ok(None),
        Some(r) => r,
    };

    let key = match ref_ {
        ElementRef::Callback(cb) => return Ok(Some(cb)),
        ElementRef::Str(key) => key,
    };

    let owner_id = owner.ok_or(Error::MissingOwner)?;

    if let Some(current) = current {
        if let Some(existing) = &current.ref_ {
            if existing.tag.as_deref() == Some(key.as_str()) {
                return Ok(Some(existing.clone()));
            }
        }
    }

    let owner_refs = std::rc::Rc::clone(&arena.get(owner_id).refs);
    Ok(Some(RefCallback::from_owner(key, owner_refs)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::priority::Priority;
    use crate::test_support::{blank_fiber_with_ref, TestConfig};
    use std::rc::Rc;

    #[test]
    fn passthrough_callback_ref_is_unchanged() {
        let arena = Arena::<TestConfig>::new();
        let original = RefCallback::<TestConfig>::new(Rc::new(|_| {}));
        let result =
            coerce_ref::<TestConfig>(&arena, None, Some(ElementRef::Callback(original.clone())), None)
                .unwrap();
        assert!(result.unwrap().tag.is_none());
    }

    #[test]
    fn string_ref_without_owner_is_fatal() {
        let arena = Arena::<TestConfig>::new();
        let result = coerce_ref::<TestConfig>(
            &arena,
            None,
            Some(ElementRef::Str("handle".to_string())),
            None,
        );
        assert!(matches!(result, Err(Error::MissingOwner)));
    }

    #[test]
    fn string_ref_synthesizes_owner_writing_callback() {
        let mut arena = Arena::<TestConfig>::new();
        let owner = arena.create_from_text("owner".to_string(), Priority::default());

        let result = coerce_ref::<TestConfig>(
            &arena,
            None,
            Some(ElementRef::Str("handle".to_string())),
            Some(owner),
        )
        .unwrap()
        .unwrap();

        result.call(Some("instance-a".to_string()));
        assert_eq!(
            arena.get(owner).refs.borrow().get("handle"),
            Some(&"instance-a".to_string())
        );
        result.call(None);
        assert!(arena.get(owner).refs.borrow().get("handle").is_none());
    }

    #[test]
    fn identical_string_ref_preserves_existing_callback() {
        let mut arena = Arena::<TestConfig>::new();
        let owner = arena.create_from_text("owner".to_string(), Priority::default());
        let owner_refs = Rc::clone(&arena.get(owner).refs);
        let existing = RefCallback::<TestConfig>::from_owner("handle".to_string(), owner_refs);
        let current = blank_fiber_with_ref(existing.clone());

        let result = coerce_ref::<TestConfig>(
            &arena,
            Some(&current),
            Some(ElementRef::Str("handle".to_string())),
            Some(owner),
        )
        .unwrap()
        .unwrap();

        assert_eq!(result.tag, existing.tag);
    }
}
