//! Stack parameter conversion

use stack_api::models::Parameter;

/// Convert a name → value mapping into the service's parameter list.
///
/// Output is sorted by key so the same mapping always yields the same
/// request. Keys and values are passed through unchecked.
pub fn to_parameters<I, K, V>(params: I) -> Vec<Parameter>
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<String>,
{
    let mut parameters: Vec<Parameter> = params
        .into_iter()
        .map(|(key, value)| Parameter {
            parameter_key: key.into(),
            parameter_value: value.into(),
        })
        .collect();
    parameters.sort();
    parameters
}
