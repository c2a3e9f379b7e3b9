//! A very simple simulator, intended to provide a robust guarantee of
//! correctness. This copies the approach outlined in
//! https://concerningquality.com/model-based-testing/
//!
//! Sequences of voter actions are run against a real database while a model
//! keeps track of which ballots should exist. After every step the stored
//! ballots are compared to the model and the assignment rules are checked.

pub use model::{Action, State};

use arbitrary::{Arbitrary, Unstructured};
use db::test_util::temp_database;
use rand::{rngs::StdRng, Rng, SeedableRng};

mod model;

pub fn make_test_runner() -> impl Fn(&Vec<Action>) {
    move |actions: &Vec<Action>| {
        let db = temp_database();
        let mut state = State::new(&db);
        state.run(actions);
    }
}

#[test]
pub fn random_action_sequences() {
    let runner = make_test_runner();
    let mut rng = StdRng::seed_from_u64(0x6a61_6d76_6f74_65);
    let mut bytes = vec![0u8; 2048];

    for _ in 0..16 {
        rng.fill(&mut bytes[..]);
        let mut u = Unstructured::new(&bytes);
        let actions = Vec::<Action>::arbitrary(&mut u).unwrap_or_default();
        (runner)(&actions);
    }
}

#[cfg(test)]
/// Sequences which once exposed a problem, or which exercise a corner of the
/// rules that random sequences rarely reach.
mod regressions {
    use super::make_test_runner;

    #[test]
    pub fn reg_1() {
        let runner = make_test_runner();
        (runner)(&serde_json::from_str("[]").unwrap())
    }

    #[test]
    pub fn reg_2() {
        // throttled voter asks again, then finishes their batch
        let runner = make_test_runner();
        (runner)(
            &serde_json::from_str(
                r#"
                [
                  { "AssignMore": { "voter": 6 } },
                  { "AssignMore": { "voter": 6 } },
                  { "Complete": { "voter": 6, "nth": 0, "aspects": null } },
                  { "AssignMore": { "voter": 6 } },
                  { "Complete": { "voter": 6, "nth": 4, "aspects": null } },
                  { "Complete": { "voter": 6, "nth": 9, "aspects": null } },
                  { "AssignMore": { "voter": 6 } },
                  { "AssignMore": { "voter": 6 } }
                ]
                "#,
            )
            .unwrap(),
        )
    }

    #[test]
    pub fn reg_3() {
        // reviewing your own team is refused
        let runner = make_test_runner();
        (runner)(
            &serde_json::from_str(
                r#"
                [
                  {
                    "Submit": {
                      "voter": 0,
                      "team": 0,
                      "aspects": {
                        "theme": { "score": 9.0, "comment": "" },
                        "enjoyment": { "score": -3.0, "comment": "" },
                        "aesthetics": { "score": 2.0, "comment": "" },
                        "innovation": { "score": 2.0, "comment": "" },
                        "bonus": { "score": 2.0, "comment": "" },
                        "overall": { "score": 0.0, "comment": "" }
                      }
                    }
                  },
                  { "AssignMore": { "voter": 0 } }
                ]
                "#,
            )
            .unwrap(),
        )
    }

    #[test]
    pub fn reg_4() {
        // a direct submission counts towards the first batch
        let runner = make_test_runner();
        (runner)(
            &serde_json::from_str(
                r#"
                [
                  { "Submit": { "voter": 7, "team": 1, "aspects": null } },
                  { "Submit": { "voter": 7, "team": 2, "aspects": null } },
                  { "Submit": { "voter": 7, "team": 4, "aspects": null } },
                  { "AssignMore": { "voter": 7 } },
                  { "AssignMore": { "voter": 5 } },
                  { "AssignMore": { "voter": 1 } }
                ]
                "#,
            )
            .unwrap(),
        )
    }
}
