use boa_engine::{js_string, Context, JsNativeError, JsResult, JsValue};

/// Spaces per nesting level in structured output.
const JSON_INDENT: i32 = 2;

/// A console argument after classification.
///
/// Objects (other than functions) and `null` are structured and printed as
/// indented JSON. Everything else prints as its plain string form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormattedArg {
    Primitive(String),
    Structured(String),
}

impl FormattedArg {
    pub fn render(&self) -> String {
        match self {
            FormattedArg::Primitive(text) | FormattedArg::Structured(text) => text.clone(),
        }
    }

    /// Classify a script value, serializing structured values through the
    /// realm's intrinsic `JSON.stringify`.
    pub fn from_js(value: &JsValue, context: &mut Context) -> JsResult<Self> {
        if value.is_null() || value.as_object().is_some_and(|obj| !obj.is_callable()) {
            return stringify(value, context);
        }
        if let Some(symbol) = value.as_symbol() {
            return Ok(FormattedArg::Primitive(
                symbol.descriptive_string().to_std_string_escaped(),
            ));
        }
        let text = value.to_string(context)?;
        Ok(FormattedArg::Primitive(text.to_std_string_escaped()))
    }
}

/// `JSON.stringify(value, undefined, 2)`
fn stringify(value: &JsValue, context: &mut Context) -> JsResult<FormattedArg> {
    let json = context.intrinsics().objects().json();
    let stringify = json.get(js_string!("stringify"), context)?;
    let Some(stringify) = stringify.as_callable() else {
        return Err(JsNativeError::typ()
            .with_message("JSON.stringify is not a function")
            .into());
    };
    let text = stringify.call(
        &JsValue::from(json.clone()),
        &[value.clone(), JsValue::undefined(), JsValue::from(JSON_INDENT)],
        context,
    )?;

    // toJSON may hand back undefined
    if text.is_undefined() {
        return Ok(FormattedArg::Primitive("undefined".to_string()));
    }
    Ok(FormattedArg::Structured(text.to_string(context)?.to_std_string_escaped()))
}

/// Format every argument on its own and join the pieces with a single space.
pub fn format_args(args: &[JsValue], context: &mut Context) -> JsResult<String> {
    let mut pieces = Vec::with_capacity(args.len());
    for arg in args {
        pieces.push(FormattedArg::from_js(arg, context)?.render());
    }
    Ok(pieces.join(" "))
}
