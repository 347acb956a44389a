use formsmith::editor::list::{appended, keys, move_item, reorder, without};
use formsmith::editor::{AnswerOption, DragEnd, IdGenerator, RecordId, SequentialIds, TemplateDraft};

fn options(n: usize) -> Vec<AnswerOption> {
    let ids = SequentialIds::new();
    (0..n)
        .map(|i| AnswerOption {
            value: format!("option {}", i),
            ..AnswerOption::empty(ids.next_id())
        })
        .collect()
}

fn sorted(ids: Vec<RecordId>) -> Vec<String> {
    let mut out: Vec<String> = ids.into_iter().map(|id| id.to_string()).collect();
    out.sort();
    out
}

#[test]
fn test_reorder_is_a_permutation_with_item_at_target() {
    let list = options(6);
    for from in 0..list.len() {
        for to in 0..list.len() {
            if from == to {
                continue;
            }
            let drag = DragEnd::new(list[from].id.clone(), Some(list[to].id.clone()));
            let moved = reorder(&list, &drag).expect("both ids known");

            assert_eq!(moved.len(), list.len());
            assert_eq!(sorted(keys(&moved)), sorted(keys(&list)));
            assert_eq!(moved[to].id, list[from].id);
        }
    }
}

#[test]
fn test_reorder_noop_cases() {
    let list = options(3);
    let stranger = RecordId::stored("elsewhere");

    assert!(reorder(&list, &DragEnd::new(list[1].id.clone(), Some(list[1].id.clone()))).is_none());
    assert!(reorder(&list, &DragEnd::new(list[1].id.clone(), None)).is_none());
    assert!(reorder(&list, &DragEnd::new(list[1].id.clone(), Some(stranger.clone()))).is_none());
    assert!(reorder(&list, &DragEnd::new(stranger, Some(list[0].id.clone()))).is_none());
    assert_eq!(move_item(&list, 1, 1), list);
}

#[test]
fn test_append_then_remove_restores_list() {
    let list = options(3);
    let extra = AnswerOption::empty(RecordId::stored("extra"));

    let grown = appended(&list, extra.clone());
    assert_eq!(grown.last(), Some(&extra));
    assert_eq!(without(&grown, &extra.id), list);
}

#[test]
fn test_update_then_read_back_through_draft() {
    let ids = SequentialIds::new();
    let mut draft = TemplateDraft::new();
    let question = ids.next_id();
    draft
        .add_question(question.clone(), formsmith::editor::QuestionType::Radio, 4)
        .unwrap();
    let option = ids.next_id();
    draft.add_option(&question, option.clone());

    assert!(draft.set_option_value(&question, &option, "Blue"));
    assert_eq!(draft.option(&question, &option).unwrap().value, "Blue");

    let before = draft.clone();
    assert!(!draft.set_option_value(&question, &RecordId::stored("missing"), "Red"));
    assert_eq!(draft, before);
}
