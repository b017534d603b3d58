//! Bundled algorithms that record their execution.

use crate::params::{ParamError, Params};
use algotrace_core::{TraceError, Value};
use algotrace_log::StateLog;
use algotrace_structs::{Array, Map, Stack, Text};
use serde_json::{json, Value as JsonValue};

/// Algorithm failure
#[derive(Debug, thiserror::Error)]
pub enum AlgorithmError {
    /// Bad or missing parameter
    #[error(transparent)]
    Param(#[from] ParamError),
    /// Recording failed
    #[error(transparent)]
    Trace(#[from] TraceError),
    /// Input the algorithm cannot handle
    #[error("{reason}")]
    Input {
        /// What was wrong
        reason: String,
    },
}

impl AlgorithmError {
    fn input(reason: impl Into<String>) -> Self {
        Self::Input {
            reason: reason.into(),
        }
    }
}

/// Result type for algorithm runs
pub type AlgorithmResult<T> = Result<T, AlgorithmError>;

/// A bundled algorithm
#[derive(Debug, Clone, Copy)]
pub struct Algorithm {
    /// Name used on the command line
    pub name: &'static str,
    /// One-line description
    pub description: &'static str,
    /// Parameter names it reads
    pub parameters: &'static [&'static str],
    example: fn() -> JsonValue,
    run: fn(&Params) -> AlgorithmResult<StateLog>,
}

impl Algorithm {
    /// Parameters used when none are supplied
    #[must_use]
    pub fn example(&self) -> Params {
        Params::from_json((self.example)()).unwrap_or_default()
    }

    /// Run against `params`, returning the recorded log
    ///
    /// # Errors
    ///
    /// Returns `AlgorithmError` if parameters are bad or recording fails
    pub fn run(&self, params: &Params) -> AlgorithmResult<StateLog> {
        tracing::info!(algorithm = self.name, "running algorithm");
        let log = (self.run)(params)?;
        tracing::debug!(algorithm = self.name, records = log.len(), "algorithm finished");
        Ok(log)
    }
}

/// Every bundled algorithm
pub const ALGORITHMS: &[Algorithm] = &[
    Algorithm {
        name: "bubblesort",
        description: "Sort an integer array by repeated compare and swap",
        parameters: &["array"],
        example: || json!({"array": [5, 1, 4, 2, 8]}),
        run: bubblesort,
    },
    Algorithm {
        name: "fibonacci",
        description: "Fill an array with the first n Fibonacci numbers",
        parameters: &["n"],
        example: || json!({"n": 10}),
        run: fibonacci,
    },
    Algorithm {
        name: "infix_to_postfix",
        description: "Convert an infix expression to postfix with a stack",
        parameters: &["expression"],
        example: || json!({"expression": "a+b*(c^d-e)^(f+g*h)-i"}),
        run: infix_to_postfix,
    },
    Algorithm {
        name: "word_frequency",
        description: "Count word occurrences with a map",
        parameters: &["text"],
        example: || json!({"text": "the quick fox and the lazy dog and the cat"}),
        run: word_frequency,
    },
];

/// Look up an algorithm by name
#[must_use]
pub fn find(name: &str) -> Option<&'static Algorithm> {
    ALGORITHMS.iter().find(|a| a.name == name)
}

fn bubblesort(params: &Params) -> AlgorithmResult<StateLog> {
    let log = StateLog::new();
    let mut arr = Array::new("arr", &log, params.int_list("array")?, "This is our unsorted array")?;
    for i in 0..arr.len() {
        log.add_comment(format!("Iterating the array starting from the {}th index", i))?;
        for j in i + 1..arr.len() {
            let greater = arr.compare_by(
                i,
                j,
                |a, b| Value::try_cmp(a, b),
                &format!("comparing the {}th and {}th element", i, j),
            )??;
            if greater.is_gt() {
                arr.swap(i, j, &format!("as arr[{}] > arr[{}] , we swap them", i, j))?;
            }
        }
    }
    Ok(log)
}

fn fibonacci(params: &Params) -> AlgorithmResult<StateLog> {
    let n = params.int("n")?;
    let n = usize::try_from(n)
        .ok()
        .filter(|&n| n >= 2)
        .ok_or_else(|| AlgorithmError::input("n should be at least 2"))?;
    let log = StateLog::new();
    let mut body = vec![0i64; n];
    body[1] = 1;
    let mut arr = Array::new("arr", &log, body, "initializing array")?;
    for i in 2..n {
        let a = arr.get(i - 1, "")?.as_i64().unwrap_or_default();
        let b = arr.get(i - 2, "")?.as_i64().unwrap_or_default();
        let sum = a
            .checked_add(b)
            .ok_or_else(|| AlgorithmError::input(format!("fibonacci({}) overflows i64", i)))?;
        arr.set(i, sum, "")?;
    }
    Ok(log)
}

fn precedence(op: char) -> Option<u8> {
    match op {
        '+' | '-' => Some(1),
        '*' | '/' => Some(2),
        '^' => Some(3),
        _ => None,
    }
}

/// Whether the operator on top of the stack is popped before pushing `op`
fn yields_to(op: char, top: &Value) -> AlgorithmResult<bool> {
    let top = top.as_str().and_then(|s| s.chars().next()).unwrap_or('(');
    if top == '(' {
        return Ok(false);
    }
    match (precedence(op), precedence(top)) {
        (Some(a), Some(b)) => Ok(a <= b),
        _ => Err(AlgorithmError::input("Invalid operator used")),
    }
}

fn infix_to_postfix(params: &Params) -> AlgorithmResult<StateLog> {
    let log = StateLog::new();
    let expression = params.string("expression")?;
    let exp = Text::new("expr", &log, expression, "The infix expression")?;
    let mut st = Stack::new("stack", &log, "We will use a stack to convert infix to postfix")?;
    let mut output = Text::new("output", &log, "", "We will store the postfix expression in this")?;
    let open = Value::from("(");

    for ch in exp.iter() {
        let Some(ch) = ch?.chars().next() else {
            continue;
        };
        if ch.is_whitespace() {
            continue;
        }
        if ch.is_alphanumeric() {
            output.append(
                &ch.to_string(),
                "character is operand so we directly add it to postfix",
            )?;
        } else if ch == '(' {
            st.push(ch, "We push opening bracket into stack")?;
        } else if ch == ')' {
            while !st.is_empty() && st.top("")? != open {
                let a = st.pop("pop operators till opening bracket is found")?;
                output.append(&a.to_string(), "")?;
            }
            if st.is_empty() {
                return Err(AlgorithmError::input("Invalid infix expression"));
            }
            st.pop("eject parenthesis from stack")?;
        } else {
            if precedence(ch).is_none() {
                return Err(AlgorithmError::input("Invalid operator used"));
            }
            while !st.is_empty() && yields_to(ch, &st.top("")?)? {
                let a = st.pop("pop operators with higher precedence")?;
                output.append(&a.to_string(), "")?;
            }
            st.push(ch, "add operator to stack")?;
        }
    }

    while !st.is_empty() {
        let a = st.pop("Pop remaining operators to end of expression")?;
        if a == open {
            return Err(AlgorithmError::input("Invalid infix expression"));
        }
        output.append(&a.to_string(), "")?;
    }
    log.add_comment("Infix has been converted to postfix")?;
    Ok(log)
}

fn word_frequency(params: &Params) -> AlgorithmResult<StateLog> {
    let log = StateLog::new();
    let text = params.string("text")?;
    let mut counts = Map::new("frequency", &log, "word counts")?;
    for word in text.split_whitespace() {
        let word = word.to_lowercase();
        let seen = counts.get_or(word.as_str(), 0, "")?.as_i64().unwrap_or_default();
        counts.set(word.as_str(), seen + 1, &format!("counting {}", word))?;
    }
    log.add_comment(format!("{} distinct words", counts.len()))?;
    Ok(log)
}

#[cfg(test)]
mod tests {
    use super::*;
    use algotrace_structs::Instrumented;

    fn params(document: JsonValue) -> Params {
        Params::from_json(document).unwrap()
    }

    fn final_body(log: &StateLog, kind_prefix: &str, name: &str) -> Value {
        let records = log.records();
        records
            .iter()
            .rev()
            .find(|r| {
                r.kind().starts_with(kind_prefix)
                    && r.field("variable_name") == Some(&Value::from(name))
            })
            .and_then(|r| r.field("body").cloned())
            .unwrap()
    }

    #[test]
    fn test_registry() {
        assert!(find("bubblesort").is_some());
        assert!(find("quicksort").is_none());
        for algorithm in ALGORITHMS {
            assert!(!algorithm.example().is_empty(), "{}", algorithm.name);
        }
    }

    #[test]
    fn test_bubblesort_sorts() {
        let log = bubblesort(&params(json!({"array": [5, 1, 4, 2]}))).unwrap();
        assert_eq!(final_body(&log, "array", "arr"), Value::from(vec![1, 2, 4, 5]));
        assert_eq!(log.records().get(0).unwrap().kind(), "array_declare");
        assert!(log.records().iter().any(|r| r.is_comment()));
    }

    #[test]
    fn test_fibonacci() {
        let log = fibonacci(&params(json!({"n": 7}))).unwrap();
        assert_eq!(
            final_body(&log, "array", "arr"),
            Value::from(vec![0, 1, 1, 2, 3, 5, 8])
        );
        assert!(fibonacci(&params(json!({"n": 1}))).is_err());
    }

    #[test]
    fn test_infix_to_postfix() {
        let log = infix_to_postfix(&params(json!({"expression": "a+b*(c^d-e)^(f+g*h)-i"}))).unwrap();
        assert_eq!(
            final_body(&log, "string", "output"),
            Value::from("abcd^e-fgh*+^*+i-")
        );
        assert!(log.last().unwrap().is_comment());
    }

    #[test]
    fn test_infix_rejects_unbalanced() {
        let result = infix_to_postfix(&params(json!({"expression": "a+b)"})));
        assert!(matches!(result, Err(AlgorithmError::Input { .. })));
        let result = infix_to_postfix(&params(json!({"expression": "(a+b"})));
        assert!(matches!(result, Err(AlgorithmError::Input { .. })));
        let result = infix_to_postfix(&params(json!({"expression": "a%b"})));
        assert!(matches!(result, Err(AlgorithmError::Input { .. })));
    }

    #[test]
    fn test_word_frequency() {
        let log = word_frequency(&params(json!({"text": "b a b"}))).unwrap();
        let body = final_body(&log, "map", "frequency");
        let Value::Map(entries) = body else {
            panic!("map body expected");
        };
        let counts: Vec<(String, i64)> = entries
            .iter()
            .map(|(k, v)| (k.to_string(), v.as_i64().unwrap()))
            .collect();
        assert_eq!(counts, vec![("b".to_string(), 2), ("a".to_string(), 1)]);
    }

    #[test]
    fn test_missing_param() {
        let result = bubblesort(&Params::default());
        assert!(matches!(result, Err(AlgorithmError::Param(ParamError::Missing { .. }))));
    }

    #[test]
    fn test_container_identity_in_trace() {
        let log = StateLog::new();
        let s = Stack::new("s", &log, "").unwrap();
        assert_eq!(
            log.last().unwrap().field("id"),
            Some(&Value::from(s.id().to_string()))
        );
    }
}
