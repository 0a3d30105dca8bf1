//! End-to-end scenarios on the built-in Patatoid circuit, exercising the
//! full chain: `.ckt` parsing, circuit construction, analyzer triangulation,
//! move generation, AI strategies and the race engine's turn loop.

use std::sync::Arc;
use std::time::Duration;

use grid_racetrack_core::analyzer::Analyzer;
use grid_racetrack_core::circuit::{patatoid, Circuit, Status};
use grid_racetrack_core::player::strategies::{AStarPlayer, FixedDepthPlayer};
use grid_racetrack_core::player::Player;
use grid_racetrack_core::race::{Race, Seat};

fn build_analyzer() -> Arc<Analyzer> {
    let circuit = Circuit::build(&patatoid()).expect("patatoid circuit builds");
    Arc::new(Analyzer::build(circuit).expect("patatoid analyzer builds"))
}

#[test]
fn starting_direction_points_into_the_track() {
    let circuit = Circuit::build(&patatoid()).unwrap();
    assert_eq!(circuit.starting_direction(), (0, -1));
}

#[test]
fn starting_points_cover_the_width_of_the_starting_line() {
    let circuit = Circuit::build(&patatoid()).unwrap();
    let count = circuit.starting_points().len();
    // length 126 at grid_size 10 bins into roughly a dozen starting cells.
    assert!((8..=16).contains(&count), "expected roughly 13 starting points, got {count}");
}

#[test]
fn analyzer_max_distance_is_reached_uniformly_from_every_starting_point() {
    let analyzer = build_analyzer();
    assert!(analyzer.max_distance() > 0.0);
    for &start in analyzer.circuit().starting_points() {
        let d = analyzer.distance(start).expect("starting point is reachable");
        assert!((d - analyzer.max_distance()).abs() < 1e-2, "start {start:?}: distance {d} vs max {}", analyzer.max_distance());
    }
}

#[test]
fn fixed_depth_player_picks_a_minimum_distance_move_at_the_start() {
    let analyzer = build_analyzer();
    let allowed = analyzer.next_states(None, &Default::default()).unwrap();
    assert!(!allowed.is_empty());

    let player = FixedDepthPlayer::new("fd", Arc::clone(&analyzer));
    let chosen = player.choose_move(&allowed).expect("a move is chosen");

    let chosen_distance = allowed.iter().find(|s| s.xy == chosen.xy).unwrap().distance_left;
    let best_distance = allowed.iter().map(|s| s.distance_left).fold(f64::INFINITY, f64::min);
    assert!(chosen_distance <= best_distance + 1e-6);
}

#[test]
fn astar_player_reaches_a_legal_move_from_the_start() {
    let analyzer = build_analyzer();
    let allowed = analyzer.next_states(None, &Default::default()).unwrap();

    let player = AStarPlayer::new("astar", Arc::clone(&analyzer));
    let chosen = player.choose_move(&allowed).expect("a move is chosen");
    assert!(allowed.iter().any(|s| s.xy == chosen.xy));
}

#[test]
fn human_player_blocks_until_a_move_is_submitted() {
    use grid_racetrack_core::player::HumanPlayer;

    let analyzer = build_analyzer();
    let allowed = analyzer.next_states(None, &Default::default()).unwrap();
    let human = Arc::new(HumanPlayer::new("slow-player"));

    // Exercises the same polling loop the race engine relies on to force-stop
    // a human who times out: choose_move blocks on the condvar until another
    // thread submits a move, rather than busy-waiting or returning early.
    let waiting = Arc::clone(&human);
    let allowed_for_wait = allowed.clone();
    let handle = std::thread::spawn(move || waiting.choose_move(&allowed_for_wait));
    std::thread::sleep(Duration::from_millis(50));
    assert!(!handle.is_finished(), "choose_move should still be polling for a move");

    let chosen = allowed[0];
    human.submit_move(chosen, &allowed).unwrap();
    let result = handle.join().unwrap();
    assert_eq!(result.unwrap().xy, chosen.xy);
}

#[test]
fn a_two_player_race_reaches_a_terminal_snapshot() {
    // Two seats that greedily minimize distance-to-finish make steady
    // progress around the track, so the race is expected to reach a
    // terminal status (finished, crashed or disconnected) for both seats
    // well before the deadline below.
    let analyzer = build_analyzer();
    let seats = vec![
        Seat::new(Arc::new(FixedDepthPlayer::new("a", Arc::clone(&analyzer)))),
        Seat::new(Arc::new(FixedDepthPlayer::new("b", Arc::clone(&analyzer)))),
    ];
    let race = Race::new(analyzer, seats);
    race.start();

    let deadline = std::time::Instant::now() + Duration::from_secs(30);
    let mut timed_out = false;
    loop {
        let snapshot = race.snapshot();
        if snapshot.states.iter().all(|(_, _, done)| *done) {
            break;
        }
        if std::time::Instant::now() >= deadline {
            timed_out = true;
            break;
        }
        std::thread::sleep(Duration::from_millis(20));
    }
    race.stop();

    assert!(!timed_out, "race did not reach a terminal snapshot in time");
    let snapshot = race.snapshot();
    assert_eq!(snapshot.states.len(), 2);
    assert!(snapshot.states.iter().all(|(_, state, _)| state.map(|s| s.status != Status::Running).unwrap_or(false)));
}
