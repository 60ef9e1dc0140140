/// The response generator: variable resolution, mood lookup, and
/// template selection.
///
/// Random draws happen in a fixed order so that a seeded generator
/// reproduces the same responses: one draw per variable resolved from
/// its defaults (variables visited in lexicographic key order), then
/// one draw for the template.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rustc_hash::FxHashMap;
use std::io;
use thiserror::Error;

use crate::core::template::Template;
use crate::schema::responses::{Overrides, ResponseType, Responses, Spiciness, Variable, VariableKey};

#[derive(Debug, Error)]
pub enum GeneratorError {
    /// A mood declares an empty template list for one response type.
    #[error("no templates for {mood}.{response}")]
    NoTemplates {
        mood: Spiciness,
        response: ResponseType,
    },
    /// A variable needs a random default but has none.
    #[error("no default values for variable '{0}'")]
    NoDefaults(VariableKey),
    /// The resolved mood has no templates for the requested response type.
    #[error("no templates for mood '{mood}' and response type '{response}'")]
    UnmatchedMood {
        mood: Spiciness,
        response: ResponseType,
    },
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

/// Compiled templates of one mood, both lists non-empty.
#[derive(Debug, Clone)]
struct CompiledMood {
    positive: Vec<Template>,
    negative: Vec<Template>,
}

impl CompiledMood {
    fn templates(&self, response: ResponseType) -> &[Template] {
        match response {
            ResponseType::Positive => &self.positive,
            ResponseType::Negative => &self.negative,
        }
    }
}

/// Generates responses from a [`Responses`] configuration.
///
/// Calls take `&mut self`: the random source is the only mutable state,
/// and a generator is used from one place at a time. Independent
/// generators can run on separate threads.
#[derive(Debug, Clone)]
pub struct Generator<R = StdRng> {
    rng: R,
    /// Sorted by key; this is the resolution order.
    variables: Vec<(VariableKey, Variable)>,
    templates: FxHashMap<Spiciness, CompiledMood>,
}

impl Generator<StdRng> {
    /// Build a generator with an entropy-seeded random source.
    pub fn new(responses: &Responses) -> Result<Self, GeneratorError> {
        Self::with_rng(responses, StdRng::from_entropy())
    }

    /// Build a generator whose output is reproducible for `seed`.
    pub fn with_seed(responses: &Responses, seed: u64) -> Result<Self, GeneratorError> {
        Self::with_rng(responses, StdRng::seed_from_u64(seed))
    }
}

impl<R: Rng> Generator<R> {
    /// Build a generator around a caller-supplied random source.
    ///
    /// Every mood is compiled up front; a mood with an empty positive or
    /// negative list fails construction with
    /// [`GeneratorError::NoTemplates`]. Variables with no defaults are
    /// accepted here and only fail at generation time.
    pub fn with_rng(responses: &Responses, rng: R) -> Result<Self, GeneratorError> {
        let mut variables: Vec<(VariableKey, Variable)> = responses
            .vars
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        variables.sort_by(|a, b| a.0.cmp(&b.0));

        // Sorted so the first reported error does not depend on map order.
        let mut moods: Vec<_> = responses.moods.iter().collect();
        moods.sort_by(|a, b| a.0.cmp(b.0));

        let mut templates = FxHashMap::default();
        let mut template_count = 0;
        for (spiciness, mood) in moods {
            for response in ResponseType::ALL {
                if mood.templates(response).is_empty() {
                    return Err(GeneratorError::NoTemplates {
                        mood: spiciness.clone(),
                        response,
                    });
                }
            }

            let compile = |raw: &[String]| raw.iter().map(|t| Template::compile(t)).collect::<Vec<_>>();
            let compiled = CompiledMood {
                positive: compile(&mood.positive),
                negative: compile(&mood.negative),
            };
            template_count += compiled.positive.len() + compiled.negative.len();
            templates.insert(spiciness.clone(), compiled);
        }

        tracing::debug!(
            moods = templates.len(),
            templates = template_count,
            variables = variables.len(),
            "compiled response generator"
        );

        Ok(Generator {
            rng,
            variables,
            templates,
        })
    }

    /// Variable keys in resolution order.
    pub fn variable_keys(&self) -> impl Iterator<Item = &VariableKey> {
        self.variables.iter().map(|(k, _)| k)
    }

    /// Moods this generator can respond in, in no particular order.
    pub fn moods(&self) -> impl Iterator<Item = &Spiciness> {
        self.templates.keys()
    }

    pub fn rng_mut(&mut self) -> &mut R {
        &mut self.rng
    }

    pub fn into_rng(self) -> R {
        self.rng
    }

    /// Generate one response.
    ///
    /// Overridden variables take the override verbatim and consume no
    /// randomness; overrides for keys the configuration does not declare
    /// are ignored.
    pub fn generate(
        &mut self,
        response: ResponseType,
        overrides: &Overrides,
    ) -> Result<String, GeneratorError> {
        let (template, values) = self.select(response, overrides)?;
        Ok(template.render(&values))
    }

    /// Generate one response straight into `w`.
    ///
    /// Nothing is written if selection fails. A write error stops
    /// rendering and leaves `w` partially written.
    pub fn generate_to<W: io::Write + ?Sized>(
        &mut self,
        w: &mut W,
        response: ResponseType,
        overrides: &Overrides,
    ) -> Result<(), GeneratorError> {
        let (template, values) = self.select(response, overrides)?;
        template.render_to(w, &values)?;
        Ok(())
    }

    fn select<'a>(
        &'a mut self,
        response: ResponseType,
        overrides: &'a Overrides,
    ) -> Result<(&'a Template, FxHashMap<&'a str, &'a str>), GeneratorError> {
        let mut values =
            FxHashMap::with_capacity_and_hasher(self.variables.len(), Default::default());

        for (key, var) in &self.variables {
            let value = match overrides.get(key) {
                Some(value) => value.as_str(),
                None => {
                    if var.defaults.is_empty() {
                        return Err(GeneratorError::NoDefaults(key.clone()));
                    }
                    var.defaults[self.rng.gen_range(0..var.defaults.len())].as_str()
                }
            };
            values.insert(key.as_str(), value);
        }

        let mood = values.get("mood").copied().unwrap_or("");
        let templates = self
            .templates
            .get(mood)
            .map(|compiled| compiled.templates(response))
            .ok_or_else(|| GeneratorError::UnmatchedMood {
                mood: Spiciness::from(mood),
                response,
            })?;

        let template = &templates[self.rng.gen_range(0..templates.len())];
        tracing::trace!(mood, %response, "selected template");
        Ok((template, values))
    }
}
