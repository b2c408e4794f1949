use snake_learner::game::RngSource;
use snake_learner::metrics::HistoryField;
use snake_learner::rl::persistence::{load_q_table, save_q_table};
use snake_learner::rl::{LearnerConfig, SnakeLearner};
use tempfile::TempDir;

fn trained(episodes: usize, seed: u64) -> SnakeLearner {
    let mut learner = SnakeLearner::new(LearnerConfig::default(), RngSource::seeded(seed)).unwrap();
    for _ in 0..episodes {
        learner.run_iteration(true).unwrap();
    }
    learner
}

#[test]
fn test_training_improves_scores() {
    let learner = trained(3000, 17);
    let scores = learner.history().values(HistoryField::Score);

    let early: f64 = scores[..500].iter().sum::<f64>() / 500.0;
    let late = learner.history().mean(HistoryField::Score, 500).unwrap();

    assert!(late > early, "late mean {} should beat early mean {}", late, early);
    assert!(learner.history().max(HistoryField::Score).unwrap() > 3.0);
}

#[test]
fn test_history_is_consistent() {
    let learner = trained(200, 5);
    let records = learner.history().records();
    assert_eq!(records.len(), 200);

    let mut previous_states = 0;
    for record in records {
        assert!(record.score >= 3);
        assert!(record.duration >= 1);
        assert!(record.states >= previous_states);
        assert!((record.velocity - record.score as f64 / record.duration as f64).abs() < 1e-12);
        previous_states = record.states;
    }
    assert_eq!(records.last().unwrap().states, learner.q_table().len());

    let best = learner.best_game().unwrap();
    assert_eq!(best.score() as f64, learner.history().max(HistoryField::Score).unwrap());
}

#[test]
fn test_saved_table_drives_evaluation() {
    let learner = trained(500, 23);
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("q_table.json");
    save_q_table(learner.q_table(), &path).unwrap();

    let table = load_q_table(&path).unwrap();
    assert_eq!(&table, learner.q_table());

    let config = LearnerConfig {
        epsilon: 0.0,
        max_moves_to_score: Some(128),
        ..Default::default()
    };
    let mut evaluator = SnakeLearner::new(config, RngSource::seeded(1)).unwrap();
    evaluator.load_q_table(table.clone());
    for _ in 0..20 {
        let mut board = evaluator.new_board().unwrap();
        evaluator.run_episode(&mut board, false);
    }

    assert_eq!(evaluator.history().len(), 20);
    for (state, values) in table.iter() {
        assert_eq!(evaluator.q_table().get(state), Some(values));
    }
}
