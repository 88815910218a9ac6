//! Tests for context window extraction on ContextTree

use commander_core::{
    AppendNode, ChatMessage, ContextTree, MessageId, Role, DEFAULT_CONTEXT_LIMIT,
};

const PROMPT: &str = "stay in character";

fn tree() -> ContextTree {
    ContextTree::new(PROMPT, "gpt-test")
}

fn id(value: i64) -> MessageId {
    MessageId::from(value)
}

fn root_message() -> ChatMessage {
    ChatMessage::new(Role::System, PROMPT)
}

/// Builds root <- 1 <- 2 <- ... <- len, alternating user and assistant turns.
fn chain(len: i64) -> ContextTree {
    let mut tree = tree();
    for i in 1..=len {
        let role = if i % 2 == 1 { Role::User } else { Role::Assistant };
        let prev = (i > 1).then(|| id(i - 1));
        tree.append(AppendNode::new(role, i, format!("m{i}")).with_prev(prev))
            .unwrap();
    }
    tree
}

#[test]
fn test_single_message_context() {
    let mut tree = tree();
    tree.append(AppendNode::user(1i64, "hello")).unwrap();

    let context = tree.get_context(&id(1), DEFAULT_CONTEXT_LIMIT);
    assert_eq!(
        context,
        vec![root_message(), ChatMessage::new(Role::User, "hello")]
    );
}

#[test]
fn test_unknown_id_returns_root_only() {
    let tree = chain(3);
    let context = tree.get_context(&id(404), DEFAULT_CONTEXT_LIMIT);
    assert_eq!(context, vec![root_message()]);
}

#[test]
fn test_chain_within_limit_includes_root_once() {
    for len in 1..=5 {
        let tree = chain(len);
        let context = tree.get_context(&id(len), 5);

        assert_eq!(context.len(), len as usize + 1);
        assert_eq!(context[0], root_message());
        let contents: Vec<_> = context[1..].iter().map(|m| m.content.clone()).collect();
        let expected: Vec<_> = (1..=len).map(|i| format!("m{i}")).collect();
        assert_eq!(contents, expected);
        assert_eq!(
            context.iter().filter(|m| m.role == Role::System).count(),
            1
        );
    }
}

#[test]
fn test_three_message_chain_with_limit_two() {
    let mut tree = tree();
    tree.append(AppendNode::user(1i64, "a")).unwrap();
    tree.append(AppendNode::assistant(2i64, "b").with_prev(Some(id(1))))
        .unwrap();
    tree.append(AppendNode::user(3i64, "c").with_prev(Some(id(2))))
        .unwrap();

    // The walk gathers limit + 1 = 3 messages before checking the root, so the
    // root prompt is put in front of all of them.
    let context = tree.get_context(&id(3), 2);
    assert_eq!(
        context,
        vec![
            root_message(),
            ChatMessage::new(Role::User, "a"),
            ChatMessage::new(Role::Assistant, "b"),
            ChatMessage::new(Role::User, "c"),
        ]
    );
}

#[test]
fn test_truncated_chain_keeps_newest_messages() {
    let tree = chain(10);
    let context = tree.get_context(&id(10), 3);

    // limit + 1 walked messages plus the synthetic root
    assert_eq!(context.len(), 5);
    assert_eq!(context[0], root_message());
    let contents: Vec<_> = context[1..].iter().map(|m| m.content.as_str()).collect();
    assert_eq!(contents, vec!["m7", "m8", "m9", "m10"]);
}

#[test]
fn test_chain_reaching_root_exactly_at_limit() {
    // Two messages and limit 1: the walk takes both and stops before the root,
    // the root is then patched in front.
    let tree = chain(2);
    let context = tree.get_context(&id(2), 1);
    assert_eq!(context.len(), 3);
    assert_eq!(context[0], root_message());
}

#[test]
fn test_branches_share_ancestors() {
    let mut tree = chain(2);
    tree.append(AppendNode::user(3i64, "left").with_prev(Some(id(2))))
        .unwrap();
    tree.append(AppendNode::user(4i64, "right").with_prev(Some(id(2))))
        .unwrap();

    let left = tree.get_context(&id(3), DEFAULT_CONTEXT_LIMIT);
    let right = tree.get_context(&id(4), DEFAULT_CONTEXT_LIMIT);

    assert_eq!(left[..3], right[..3]);
    assert_eq!(left[3].content, "left");
    assert_eq!(right[3].content, "right");
}

#[test]
fn test_orphan_chain_gets_root_prepended() {
    let mut tree = tree();
    tree.append_detached(AppendNode::user(1i64, "orphan head"))
        .unwrap();
    tree.append(AppendNode::assistant(2i64, "follow up").with_prev(Some(id(1))))
        .unwrap();

    let head = tree.lookup(&id(1)).unwrap();
    assert!(!head.has_predecessor());
    assert!(tree.predecessor(head).is_none());

    let context = tree.get_context(&id(2), DEFAULT_CONTEXT_LIMIT);
    assert_eq!(
        context,
        vec![
            root_message(),
            ChatMessage::new(Role::User, "orphan head"),
            ChatMessage::new(Role::Assistant, "follow up"),
        ]
    );
}

#[test]
fn test_orphan_system_head_is_not_patched() {
    // The root check compares roles only: a chain that starts with a system
    // message is left as is.
    let mut tree = tree();
    tree.append_detached(AppendNode::new(Role::System, 1i64, "imported prompt"))
        .unwrap();
    tree.append(AppendNode::user(2i64, "question").with_prev(Some(id(1))))
        .unwrap();

    let context = tree.get_context(&id(2), DEFAULT_CONTEXT_LIMIT);
    assert_eq!(context.len(), 2);
    assert_eq!(context[0].content, "imported prompt");
}

#[test]
fn test_raw_context_unknown_or_missing_id_is_empty() {
    let tree = chain(3);
    assert!(tree.get_raw_context(None).is_empty());
    assert!(tree.get_raw_context(Some(&id(99))).is_empty());
}

#[test]
fn test_raw_context_chains_prev_message_ids() {
    let mut tree = tree();
    tree.append(AppendNode::user(1i64, "a").with_name("Private Ryan"))
        .unwrap();
    tree.append(AppendNode::assistant(2i64, "b").with_prev(Some(id(1))))
        .unwrap();
    tree.append(AppendNode::user(3i64, "c").with_prev(Some(id(2))))
        .unwrap();

    let records = tree.get_raw_context(Some(&id(3)));
    assert_eq!(records.len(), 4);

    let root = &records[0];
    assert_eq!(root.role, Role::System);
    assert_eq!(root.message_id, None);
    assert_eq!(root.model.as_deref(), Some("gpt-test"));

    assert_eq!(records[1].message_id, Some(id(1)));
    assert_eq!(records[1].prev_message_id, None);
    assert_eq!(records[1].name.as_deref(), Some("Private_Ryan"));
    assert_eq!(records[2].prev_message_id, Some(id(1)));
    assert_eq!(records[3].prev_message_id, Some(id(2)));
    assert!(records[1..].iter().all(|r| r.model.is_none()));
}

#[test]
fn test_raw_context_has_no_limit_and_no_synthetic_root() {
    let tree = chain(40);
    assert_eq!(tree.get_raw_context(Some(&id(40))).len(), 41);

    let mut orphaned = ContextTree::new(PROMPT, "gpt-test");
    orphaned
        .append_detached(AppendNode::user(1i64, "head"))
        .unwrap();
    orphaned
        .append(AppendNode::user(2i64, "tail").with_prev(Some(id(1))))
        .unwrap();
    let records = orphaned.get_raw_context(Some(&id(2)));
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].content, "head");
    assert!(records.iter().all(|r| r.role != Role::System));
}

#[test]
fn test_raw_record_json_shape() {
    let mut tree = tree();
    tree.append(AppendNode::user(1i64, "a")).unwrap();
    tree.append(AppendNode::assistant(2i64, "b").with_prev(Some(id(1))).with_name("Bot"))
        .unwrap();

    let json = serde_json::to_value(tree.get_raw_context(Some(&id(2)))).unwrap();
    assert_eq!(
        json,
        serde_json::json!([
            {"role": "system", "content": PROMPT, "model": "gpt-test"},
            {"role": "user", "content": "a", "message_id": "1"},
            {"role": "assistant", "content": "b", "message_id": "2", "prev_message_id": "1", "name": "Bot"},
        ])
    );
}

#[test]
fn test_predecessors_always_precede_their_nodes() {
    // Ids are appended in an order where many predecessors are unknown at
    // append time; those must fall back to the root, never to a later node.
    let mut tree = tree();
    let order = [5i64, 3, 8, 1, 9, 2, 7, 4, 6];
    for (step, &msg) in order.iter().enumerate() {
        let prev = Some(id(msg - 1));
        tree.append(AppendNode::user(msg, format!("m{msg}")).with_prev(prev))
            .unwrap();

        let appended_so_far = &order[..step];
        let node = tree.lookup(&id(msg)).unwrap();
        match tree.predecessor(node).and_then(|p| p.message_id()) {
            Some(prev_id) => {
                assert_ne!(prev_id, &id(msg));
                let prev_value: i64 = prev_id.as_str().parse().unwrap();
                assert!(appended_so_far.contains(&prev_value));
            }
            None => assert_eq!(tree.predecessor(node).unwrap().role(), Role::System),
        }
    }
}

#[test]
fn test_empty_content_is_rejected() {
    let mut tree = tree();
    assert!(tree.append(AppendNode::user(1i64, "")).is_err());
    assert!(!tree.exists(&id(1)));
}
