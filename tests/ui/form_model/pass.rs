use formstate::form::{FormController, FormModel, FormValues, Validation};

#[derive(Clone, Debug, PartialEq, formstate::form::FormModel)]
struct DemoForm {
    email: String,
    nickname: String,
}

fn main() {
    let fields = DemoForm::fields();
    assert_eq!(fields.email().as_str(), "email");
    assert_eq!(DemoForm::keys().len(), 2);

    let model = DemoForm {
        email: "a@example.com".to_string(),
        nickname: String::new(),
    };
    let form = FormController::for_model(
        Validation::per_field()
            .field("email", |value: &str, _: &FormValues, _: &()| -> Option<String> {
                (!value.contains('@')).then(|| "invalid".to_string())
            })
            .unchecked("nickname"),
        &model,
        (),
    )
    .expect("create form");
    form.on_change(fields.nickname().as_str(), "calm")
        .expect("change nickname");
    assert_eq!(form.model::<DemoForm>().expect("model").nickname, "calm");
}
