use std::collections::HashMap;

use engine::ContentError;
use rand::Rng;
use thiserror::Error;

/// The story script that ships inside the binary; an on-disk
/// `assets/base/script.xml` with the same shape replaces it when present.
const DEFAULT_SCRIPT_XML: &str = r#"
<script>
  <section id="intro">
    <line>WORD REACHES THE PRECINCT: %1</line>
    <line>THE WRONG MAN STANDS ON THE GALLOWS FOR IT.</line>
    <line>ONLY THE RIGHT WORD CUTS HIM DOWN.</line>
  </section>
  <section id="first_run">
    <line>ARROWS MOVE. ENTER COMMITS. CHOOSE WISELY.</line>
  </section>
  <section id="already_guessed">
    <line>YOU ALREADY TRIED '%1'. THE CROWD NOTICED.</line>
  </section>
  <section id="timeout">
    <line>TOO SLOW. THE HANGMAN TIGHTENS THE KNOT.</line>
  </section>
  <section id="won">
    <line>THE WORD WAS '%1'. THE ROPE COMES OFF.</line>
    <line>CASE CLOSED, DETECTIVE.</line>
  </section>
  <section id="lost">
    <line>THE TRAPDOOR DROPS. THE WORD WAS '%1'.</line>
    <line>SOME CASES STAY COLD.</line>
  </section>
  <crimes>
    <crime>THE MAYOR'S PRIZE GREYHOUND HAS VANISHED.</crime>
    <crime>SOMEONE EMPTIED THE EVIDENCE LOCKER OVERNIGHT.</crime>
    <crime>THE HARBOR MASTER'S LEDGER IS FULL OF GHOST SHIPS.</crime>
    <crime>A FORGER SIGNED THE JUDGE'S NAME THREE TIMES.</crime>
    <crime nsfl="true">THE UNDERTAKER HAS ONE COFFIN TOO MANY.</crime>
    <crime nsfl="true">SOMETHING IN THE CANAL WON'T STAY SUNK.</crime>
  </crimes>
</script>
"#;

#[derive(Debug, Error)]
pub enum ScriptError {
    #[error("script parse failed: {0}")]
    Parse(#[from] roxmltree::Error),
    #[error("script root element must be <script>")]
    WrongRoot,
}

#[derive(Debug, Clone)]
struct Crime {
    text: String,
    nsfl: bool,
}

/// Parsed story script: ordered dialogue sections plus the crime pool.
#[derive(Debug, Clone)]
pub struct ScriptStore {
    sections: HashMap<String, Vec<String>>,
    crimes: Vec<Crime>,
}

impl ScriptStore {
    pub fn from_xml(xml: &str) -> Result<Self, ScriptError> {
        let document = roxmltree::Document::parse(xml)?;
        let root = document.root_element();
        if root.tag_name().name() != "script" {
            return Err(ScriptError::WrongRoot);
        }

        let mut sections = HashMap::new();
        let mut crimes = Vec::new();
        for node in root.children().filter(|node| node.is_element()) {
            match node.tag_name().name() {
                "section" => {
                    let Some(id) = node.attribute("id") else {
                        continue;
                    };
                    let lines: Vec<String> = node
                        .children()
                        .filter(|child| child.is_element() && child.tag_name().name() == "line")
                        .filter_map(|line| line.text())
                        .map(|text| text.trim().to_string())
                        .filter(|text| !text.is_empty())
                        .collect();
                    sections.insert(id.to_string(), lines);
                }
                "crimes" => {
                    for crime in node
                        .children()
                        .filter(|child| child.is_element() && child.tag_name().name() == "crime")
                    {
                        let Some(text) = crime.text() else {
                            continue;
                        };
                        crimes.push(Crime {
                            text: text.trim().to_string(),
                            nsfl: crime.attribute("nsfl") == Some("true"),
                        });
                    }
                }
                _ => {}
            }
        }
        Ok(Self { sections, crimes })
    }

    pub fn builtin() -> Self {
        Self::from_xml(DEFAULT_SCRIPT_XML).expect("embedded script is valid")
    }

    pub fn section(&self, id: &str, substitutions: &[&str]) -> Result<Vec<String>, ContentError> {
        let lines = self
            .sections
            .get(id)
            .filter(|lines| !lines.is_empty())
            .ok_or_else(|| ContentError::MissingSection(id.to_string()))?;
        Ok(lines
            .iter()
            .map(|line| substitute(line, substitutions))
            .collect())
    }

    pub fn random_crime(
        &self,
        nsfl_allowed: bool,
        rng: &mut impl Rng,
    ) -> Result<String, ContentError> {
        let pool: Vec<&Crime> = self
            .crimes
            .iter()
            .filter(|crime| nsfl_allowed || !crime.nsfl)
            .collect();
        if pool.is_empty() {
            return Err(ContentError::NoCrimeAvailable);
        }
        let index = rng.gen_range(0..pool.len());
        Ok(pool[index].text.clone())
    }
}

/// Replaces `%1`..`%9` placeholders with the corresponding substitution.
/// Highest index first so `%1` never eats the prefix of a later slot.
pub(crate) fn substitute(line: &str, substitutions: &[&str]) -> String {
    let mut out = line.to_string();
    for (index, value) in substitutions.iter().enumerate().take(9).rev() {
        out = out.replace(&format!("%{}", index + 1), value);
    }
    out
}
