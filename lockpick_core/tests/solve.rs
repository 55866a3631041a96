use std::collections::HashSet;

use lockpick_core::{
    BoardError, Explorer, Path, Position, SelectError, load_board, search, select_best_by_key,
};

fn labels(path: &Path) -> Vec<String> {
    path.labelled_steps().map(|(_, label)| label).collect()
}

#[test]
fn bundled_level_loads() {
    let state = load_board(include_str!("../../boards/level01.txt")).unwrap();
    assert_eq!(state.grid().width(), 17);
    assert_eq!(state.grid().height(), 11);
    assert_eq!(state.position(), Position::new(3, 5));
    assert!(!state.is_terminal());
}

#[test]
fn floor_only_board_has_one_path_and_one_state() {
    let state = load_board(
        "
████████████████████████
████####            ████
████████████████    ████
████████████████!!!!████
████████████████████████
",
    )
    .unwrap();
    let mut explorer = Explorer::new();
    let paths = explorer.search(&state);

    assert_eq!(paths.len(), 1);
    assert_eq!(labels(&paths[0]), vec!["Exit at 4,3"]);
    assert_eq!(explorer.visited(), 1);
}

#[test]
fn unreachable_exit_reports_no_solution() {
    let state = load_board(
        "
████████████████
████####K1pp████
████████████!!!!
",
    )
    .unwrap();
    let paths = search(&state);
    assert!(paths.is_empty());
    assert_eq!(select_best_by_key(&paths, 'p'), Err(SelectError::NoSolutionFound));
}

#[test]
fn malformed_boards_fail_to_load() {
    assert!(matches!(
        load_board("####!!!!\n████"),
        Err(BoardError::RaggedRow { .. })
    ));
    assert_eq!(load_board("████!!!!"), Err(BoardError::MissingStart));
}

#[test]
fn best_path_collects_both_keys() {
    let state = load_board("████K5pp████\nK2pp####!!!!").unwrap();
    let paths = search(&state);

    let finals: Vec<i32> = paths
        .iter()
        .map(|path| path.final_state().unwrap().keys().get('p'))
        .collect();
    assert_eq!(finals, vec![2, 7, 0, 5]);

    let best = select_best_by_key(&paths, 'p').unwrap();
    assert_eq!(
        labels(best),
        vec![
            "Pick up 2 p key at 0,1",
            "Pick up 5 p key at 1,0",
            "Exit at 2,1",
        ]
    );
}

#[test]
fn every_reported_terminal_state_is_distinct() {
    let state = load_board("████K5pp████\nK2pp####!!!!").unwrap();
    let paths = search(&state);
    let finals: HashSet<_> = paths.iter().filter_map(Path::final_state).collect();
    assert_eq!(finals.len(), paths.len());
}

#[test]
fn starred_color_survives_door() {
    let state = load_board("####K3ppS-pp03pp!!!!").unwrap();
    let paths = search(&state);
    assert_eq!(paths.len(), 1);
    assert_eq!(
        labels(&paths[0]),
        vec![
            "Pick up 3 p key at 1,0",
            "Pick up p star key at 2,0",
            "Open 3 p door at 3,0",
            "Exit at 4,0",
        ]
    );
    let last = paths[0].final_state().unwrap();
    assert_eq!(last.keys().get('p'), 3);
    assert!(last.is_starred('p'));
}

#[test]
fn toggle_opens_gate_to_exit() {
    let state = load_board("Tq  ####Pq█ !!!!").unwrap();
    let paths = search(&state);
    assert_eq!(paths.len(), 1);
    assert_eq!(labels(&paths[0]), vec!["Trigger toggle at 0,0", "Exit at 3,0"]);
    assert!(paths[0].final_state().unwrap().is_toggled('q'));
}

#[test]
fn curse_lets_brown_pay_for_a_door() {
    let state = load_board("K1nn####01cc!!!!").unwrap();
    let paths = search(&state);
    assert_eq!(paths.len(), 1);
    assert_eq!(
        labels(&paths[0]),
        vec![
            "Pick up 1 n key at 0,0",
            "Curse 1 c door at 2,0",
            "Open cursed 1 c door at 2,0",
            "Exit at 3,0",
        ]
    );
    assert!(paths[0].final_state().unwrap().keys().is_empty());
}

#[test]
fn equal_scores_select_the_first_path() {
    let state = load_board("K1qq####!!!!").unwrap();
    let paths = search(&state);
    assert_eq!(paths.len(), 2);
    let best = select_best_by_key(&paths, 'p').unwrap();
    assert_eq!(best, &paths[0]);
    assert_eq!(best.len(), 2);
}

#[test]
fn no_zero_counts_along_any_path() {
    let state = load_board("K1nn####01cc!!!!").unwrap();
    for path in search(&state) {
        for edge in path.steps() {
            assert!(edge.state.keys().iter().all(|(_, count)| count != 0));
        }
    }
}

#[test]
fn tutorial_board_best_route() {
    let state = load_board(include_str!("../../boards/tutorial.txt")).unwrap();
    let mut explorer = Explorer::new();
    let paths = explorer.search(&state);
    assert_eq!(paths.len(), 16);
    assert_eq!(explorer.visited(), 412);

    let best = select_best_by_key(&paths, 'p').unwrap();
    assert_eq!(best.final_state().unwrap().keys().get('p'), 2);
    assert_eq!(
        labels(best),
        vec![
            "Pick up 2 p key at 1,1",
            "Pick up p star key at 3,3",
            "Trigger toggle at 4,3",
            "Pick up 1 n key at 4,1",
            "Curse 1 c door at 6,1",
            "Open cursed 1 c door at 6,1",
            "Pick up 3 c key at 7,1",
            "Open blast p door at 8,5",
            "Pick up 1 r key at 3,5",
            "Unfreeze p door at 1,5",
            "Open 1 p door at 1,5",
            "Exit at 7,5",
        ]
    );
}
