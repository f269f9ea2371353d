//! Shared test fixtures. Not part of the public API.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::config::Config;
use crate::fiber::{EffectTag, Fiber, FiberKind, PendingProps, RefCallback};
use crate::priority::Priority;

#[derive(Debug)]
pub struct TestConfig;

impl Config for TestConfig {
    type ElementType = String;
    type Props = String;
    type Instance = String;
    type ContainerInfo = String;
    type PortalImpl = String;
    type CoroutineHandler = String;
    type Continuation = String;
    type YieldValue = String;
}

pub fn blank_fiber_with_ref(ref_: RefCallback<TestConfig>) -> Fiber<TestConfig> {
    Fiber {
        kind: FiberKind::Element,
        key: None,
        index: 0,
        type_tag: None,
        pending_props: PendingProps::Props(String::new()),
        state_node: None,
        ref_: Some(ref_),
        return_: None,
        sibling: None,
        child: None,
        alternate: None,
        effect_tag: EffectTag::NONE,
        next_effect: None,
        pending_work_priority: Priority::default(),
        progressed_first_deletion: None,
        progressed_last_deletion: None,
        refs: Rc::new(RefCell::new(HashMap::new())),
    }
}
