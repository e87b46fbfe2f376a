use formstate::form::{FormController, FormValues, ObjectValidator, Validation};
use proptest::prelude::*;

const KEYS: [&str; 3] = ["name", "code", "confirm"];

fn validation() -> ObjectValidator<()> {
    Validation::per_field()
        .field(
            "name",
            |value: &str, _: &FormValues, _: &()| -> Option<String> {
                value.is_empty().then(|| "required".to_string())
            },
        )
        .field(
            "code",
            |value: &str, _: &FormValues, _: &()| -> Option<String> {
                (value.len() > 5).then(|| "too long".to_string())
            },
        )
        .field(
            "confirm",
            |value: &str, values: &FormValues, _: &()| -> Option<String> {
                (values.value("code") != Some(value)).then(String::new)
            },
        )
}

fn values_strategy() -> impl Strategy<Value = FormValues> {
    prop::array::uniform3("[a-z]{0,7}").prop_map(|values| {
        KEYS.iter()
            .zip(values)
            .map(|(key, value)| (*key, value))
            .collect::<FormValues>()
    })
}

fn edits_strategy() -> impl Strategy<Value = Vec<(usize, String)>> {
    prop::collection::vec((0..KEYS.len(), "[a-z]{0,7}"), 0..12)
}

proptest! {
    #[test]
    fn pristine_tracks_value_equality_after_every_change(
        initial in values_strategy(),
        edits in edits_strategy(),
    ) {
        let form = FormController::new(validation(), initial, ()).expect("create form");
        for (index, value) in edits {
            form.on_change(KEYS[index], value).expect("change");
            let snapshot = form.snapshot().expect("snapshot");
            for field in &snapshot.fields {
                prop_assert_eq!(field.pristine, field.value == field.initial_value);
            }
            prop_assert_eq!(snapshot.pristine, snapshot.fields.iter().all(|field| field.pristine));
            prop_assert_eq!(snapshot.valid, snapshot.fields.iter().all(|field| field.error.is_none()));
            prop_assert_eq!(snapshot.valid, snapshot.errors.is_empty());
        }
    }

    #[test]
    fn blur_twice_equals_blur_once(
        initial in values_strategy(),
        index in 0..KEYS.len(),
    ) {
        let once = FormController::new(validation(), initial.clone(), ()).expect("create form");
        let twice = FormController::new(validation(), initial, ()).expect("create form");
        once.on_blur(KEYS[index]).expect("blur");
        twice.on_blur(KEYS[index]).expect("blur");
        twice.on_blur(KEYS[index]).expect("blur again");

        let once = once.snapshot().expect("snapshot");
        let twice = twice.snapshot().expect("snapshot");
        prop_assert_eq!(&once.fields, &twice.fields);
        prop_assert_eq!(&once.errors, &twice.errors);
    }

    #[test]
    fn reinitialize_matches_a_fresh_form(
        initial in values_strategy(),
        edits in edits_strategy(),
        next in values_strategy(),
    ) {
        let form = FormController::new(validation(), initial, ()).expect("create form");
        for (index, value) in edits {
            form.on_change(KEYS[index], value).expect("change");
            form.on_blur(KEYS[index]).expect("blur");
        }
        form.reinitialize(next.clone()).expect("reinitialize");
        let fresh = FormController::new(validation(), next, ()).expect("fresh form");

        let reinitialized = form.snapshot().expect("snapshot");
        let fresh = fresh.snapshot().expect("snapshot");
        prop_assert_eq!(&reinitialized.fields, &fresh.fields);
        prop_assert_eq!(&reinitialized.errors, &fresh.errors);
        prop_assert!(reinitialized.fields.iter().all(|field| field.pristine && !field.touched));
    }
}
