use assertor::*;
use rl_activity::activity::{to_json, Activity};
use rl_activity::algos::Algorithm;
use rl_activity::config::Config;
use rl_activity::envs::{simple_golf::SimpleGolf, student::Student};
use rl_activity::mdps::mdp::{GraphMdp, Mdp};
use rl_activity::playback::{Playback, RenderContext};
use rstest::*;
use std::rc::Rc;

fn run(algorithm: Algorithm, mdp: Rc<dyn Mdp>, seed: u64) -> Vec<Activity> {
    algorithm
        .run(mdp, &Config::default().with_seed(seed))
        .unwrap()
}

#[rstest]
fn logs_are_bookended_and_tagged(
    #[values(Algorithm::PolicyIteration, Algorithm::MonteCarlo, Algorithm::Sarsa)]
    algorithm: Algorithm,
    #[values(1, 42)] seed: u64,
) {
    let log = run(algorithm, Rc::new(Student::mdp().unwrap()), seed);

    assert_eq!(log.first(), Some(&Activity::StartAnimation));
    assert_eq!(log.last(), Some(&Activity::EndAnimation));
    for e in &log[1..log.len() - 1] {
        assert!(Activity::TAGS.contains(&e.tag()));
        assert_ne!(e, &Activity::StartAnimation);
        assert_ne!(e, &Activity::EndAnimation);
    }
}

#[rstest]
fn json_is_an_array_of_tagged_arrays(
    #[values(Algorithm::PolicyIteration, Algorithm::MonteCarlo, Algorithm::Sarsa)]
    algorithm: Algorithm,
) {
    let log = run(algorithm, Rc::new(SimpleGolf::mdp().unwrap()), 7);

    let json = to_json(&log, false).unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    let entries = value.as_array().unwrap();

    assert_that!(entries.to_vec()).has_length(log.len());
    for (entry, activity) in entries.iter().zip(&log) {
        let tuple = entry.as_array().unwrap();
        assert_eq!(tuple[0].as_str(), Some(activity.tag()));
    }
}

#[rstest]
fn simulations_are_balanced(#[values(Algorithm::MonteCarlo, Algorithm::Sarsa)] algorithm: Algorithm) {
    let log = run(algorithm, Rc::new(Student::mdp().unwrap()), 3);

    let mut open = false;
    for e in &log {
        match e {
            Activity::BeginSimulation => {
                assert!(!open);
                open = true;
            }
            Activity::EndSimulation => {
                assert!(open);
                open = false;
            }
            Activity::SampledState(_) | Activity::SampledAction(..) => assert!(open),
            _ => {}
        }
    }
    assert!(!open);
}

#[test]
fn same_seed_same_log() {
    for algorithm in Algorithm::ALL {
        let first = run(algorithm, Rc::new(Student::mdp().unwrap()), 5);
        let second = run(algorithm, Rc::new(Student::mdp().unwrap()), 5);
        assert_eq!(first, second);
    }
}

#[test]
fn mdp_loaded_from_json_matches_the_built_in_one() {
    let path = concat!(env!("CARGO_MANIFEST_DIR"), "/tests/data/simple_golf.json");
    let loaded = GraphMdp::from_json_file(path).unwrap();
    let built_in = SimpleGolf::mdp().unwrap();

    assert_eq!(loaded.structure(), built_in.structure());
    assert_eq!(loaded.start_states(), built_in.start_states());

    let first = run(Algorithm::PolicyIteration, Rc::new(loaded), 9);
    let second = run(Algorithm::PolicyIteration, Rc::new(built_in), 9);
    assert_eq!(first, second);
}

#[test]
fn playback_covers_the_whole_log() {
    let log = run(Algorithm::Sarsa, Rc::new(Student::mdp().unwrap()), 11);
    let playback = Playback::new(&RenderContext::default(), &log);

    let last = playback.locate(playback.total_frame_count() - 1).unwrap();
    assert_eq!(last.index, log.len() - 1);
    assert_eq!(playback.locate(playback.total_frame_count()), None);
}
