//! Agent/task/crew descriptors and the sequential runner.
//!
//! A crew is a fixed, ordered list of prompt-templated tasks. Running a task
//! means: render its templates with the run inputs, invoke each declared tool
//! exactly once, assemble a prompt from the agent identity plus upstream task
//! outputs plus tool results, and send a single completion request to the
//! model. Tool usage is declared per task and checked against the agent's
//! capability set when the crew is built; nothing is discovered at run time.

use anyhow::{Context, Result, anyhow, bail};

use crate::llm::LanguageModel;
use crate::tool::{ToolId, Toolbox};

/// A role/goal/backstory bundle plus an explicit capability set.
#[derive(Debug, Clone)]
pub struct Agent {
    pub role: String,
    pub goal: String,
    pub backstory: String,
    pub tools: Vec<ToolId>,
}

/// One tool invocation a task performs before prompting the model. The input
/// is a template over the run inputs.
#[derive(Debug, Clone)]
pub struct ToolCall {
    pub tool: ToolId,
    pub input: String,
}

#[derive(Debug, Clone)]
pub struct Task {
    pub name: String,
    /// Role of the agent that executes this task.
    pub agent: String,
    pub description: String,
    pub expected_output: String,
    /// Names of earlier tasks whose outputs feed this one.
    pub context: Vec<String>,
    pub tool_calls: Vec<ToolCall>,
}

/// Execution policy. Only sequential execution exists here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Process {
    #[default]
    Sequential,
}

/// Values substituted into task and tool templates. `location` is derived
/// from the preference text before kickoff (see [`RunInputs::for_guide`]).
#[derive(Debug, Clone, Default)]
pub struct RunInputs {
    pub user_preference: String,
    pub dietary_restrictions: String,
    pub ambiance_preference: String,
    pub location: String,
}

impl RunInputs {
    /// Build inputs for a run, deriving the dining location from the
    /// preference text via the guide's city matching.
    pub fn for_guide(
        guide: &crate::guide::VenueGuide,
        user_preference: &str,
        dietary_restrictions: &str,
        ambiance_preference: &str,
    ) -> Self {
        Self {
            user_preference: user_preference.to_string(),
            dietary_restrictions: dietary_restrictions.to_string(),
            ambiance_preference: ambiance_preference.to_string(),
            location: guide.match_city(user_preference).to_string(),
        }
    }

    pub fn render(&self, template: &str) -> String {
        template
            .replace("{user_preference}", &self.user_preference)
            .replace("{dietary_restrictions}", &self.dietary_restrictions)
            .replace("{ambiance_preference}", &self.ambiance_preference)
            .replace("{location}", &self.location)
    }
}

#[derive(Debug)]
pub struct Crew {
    agents: Vec<Agent>,
    tasks: Vec<Task>,
    process: Process,
}

impl Crew {
    /// Build a crew, rejecting wiring mistakes up front: duplicate roles,
    /// tasks naming unknown agents, context edges that don't point at an
    /// earlier task, and tool calls outside the agent's capability set.
    pub fn new(agents: Vec<Agent>, tasks: Vec<Task>, process: Process) -> Result<Self> {
        if tasks.is_empty() {
            bail!("A crew needs at least one task");
        }

        for (index, agent) in agents.iter().enumerate() {
            if agents[..index].iter().any(|other| other.role == agent.role) {
                bail!("Duplicate agent role '{}'", agent.role);
            }
        }

        for (index, task) in tasks.iter().enumerate() {
            let agent = agents
                .iter()
                .find(|agent| agent.role == task.agent)
                .ok_or_else(|| {
                    anyhow!("Task '{}' names unknown agent '{}'", task.name, task.agent)
                })?;

            for call in &task.tool_calls {
                if !agent.tools.contains(&call.tool) {
                    bail!(
                        "Task '{}' uses tool '{}' but agent '{}' does not hold that capability",
                        task.name,
                        call.tool,
                        agent.role
                    );
                }
            }

            for upstream in &task.context {
                if !tasks[..index].iter().any(|earlier| &earlier.name == upstream) {
                    bail!(
                        "Task '{}' depends on '{}', which is not an earlier task",
                        task.name,
                        upstream
                    );
                }
            }
        }

        Ok(Self {
            agents,
            tasks,
            process,
        })
    }

    /// Run the tasks under the crew's execution policy and return the final
    /// task's output.
    pub async fn kickoff(
        &self,
        inputs: &RunInputs,
        toolbox: &Toolbox,
        model: &dyn LanguageModel,
    ) -> Result<String> {
        match self.process {
            Process::Sequential => self.run_sequential(inputs, toolbox, model).await,
        }
    }

    async fn run_sequential(
        &self,
        inputs: &RunInputs,
        toolbox: &Toolbox,
        model: &dyn LanguageModel,
    ) -> Result<String> {
        let mut outputs: Vec<(String, String)> = Vec::with_capacity(self.tasks.len());

        for task in &self.tasks {
            tracing::info!(task = %task.name, agent = %task.agent, "running task");

            let agent = self
                .agents
                .iter()
                .find(|agent| agent.role == task.agent)
                .ok_or_else(|| anyhow!("Agent '{}' missing at run time", task.agent))?;

            let mut tool_results: Vec<(ToolId, String)> = Vec::new();
            for call in &task.tool_calls {
                let tool = toolbox
                    .get(call.tool)
                    .ok_or_else(|| anyhow!("Tool '{}' is not in the toolbox", call.tool))?;
                let argument = inputs.render(&call.input);
                tracing::debug!(tool = %call.tool, input = %argument, "invoking tool");
                tool_results.push((call.tool, tool.call(&argument).await));
            }

            let prompt = compose_prompt(agent, task, inputs, &outputs, &tool_results);
            let output = model
                .complete(&prompt)
                .await
                .with_context(|| format!("Task '{}' failed", task.name))?;

            tracing::debug!(task = %task.name, chars = output.len(), "task completed");
            outputs.push((task.name.clone(), output));
        }

        // new() guarantees at least one task ran.
        Ok(outputs.pop().map(|(_, output)| output).unwrap_or_default())
    }
}

fn compose_prompt(
    agent: &Agent,
    task: &Task,
    inputs: &RunInputs,
    outputs: &[(String, String)],
    tool_results: &[(ToolId, String)],
) -> String {
    let mut prompt = format!(
        "You are {}.\n{}\nYour goal: {}\n",
        agent.role, agent.backstory, agent.goal
    );

    let context: Vec<&(String, String)> = outputs
        .iter()
        .filter(|(name, _)| task.context.contains(name))
        .collect();
    if !context.is_empty() {
        prompt.push_str("\nContext from earlier steps:\n");
        for (name, output) in context {
            prompt.push_str(&format!("\n### {name}\n{output}\n"));
        }
    }

    if !tool_results.is_empty() {
        prompt.push_str("\nTool results:\n");
        for (tool, result) in tool_results {
            prompt.push_str(&format!("\n### {tool}\n{result}\n"));
        }
    }

    prompt.push_str(&format!("\nTask:\n{}\n", inputs.render(&task.description)));
    prompt.push_str(&format!(
        "\nExpected output:\n{}\n",
        inputs.render(&task.expected_output)
    ));
    prompt
}

/// The four-stage recommendation pipeline: research → (optional) weather
/// briefing → analysis → generation.
pub fn standard_crew(include_weather: bool) -> Crew {
    let mut agents = vec![
        Agent {
            role: "Restaurant Researcher".to_string(),
            goal: "Gather initial data on top-rated restaurants based on user-provided cuisine, \
                   location, and price range."
                .to_string(),
            backstory: "A meticulous food critic who excels at finding hidden gems and popular \
                        spots. You are the first step in the recommendation process."
                .to_string(),
            tools: vec![ToolId::VenueSearch],
        },
        Agent {
            role: "Dining Experience Analyst".to_string(),
            goal: "Analyze restaurant options considering weather, peak hours, dietary \
                   restrictions, and ambiance to identify the best choice."
                .to_string(),
            backstory: "An expert dining consultant who weighs multiple factors when recommending \
                        restaurants. You can spot patterns and identify the best value and \
                        experience from a list of options."
                .to_string(),
            tools: vec![ToolId::DietaryFilter, ToolId::Ambiance, ToolId::PeakTimes],
        },
        Agent {
            role: "Personalized Recommendation Generator".to_string(),
            goal: "Synthesize the analyzed data into a final, personalized, and persuasive \
                   recommendation for the user."
                .to_string(),
            backstory: "A professional concierge who crafts perfect dining experiences. Your \
                        final output must be clear, engaging, and directly address the user's \
                        initial request."
                .to_string(),
            tools: vec![],
        },
    ];

    let mut tasks = vec![Task {
        name: "research".to_string(),
        agent: "Restaurant Researcher".to_string(),
        description: "Find 3-5 top-rated restaurants that match the user's preference: \
                      '{user_preference}'. The output must be a detailed, realistic list of \
                      restaurants, including name, cuisine, rating (e.g., 4.5/5), price range \
                      (e.g., $$$), and a brief description."
            .to_string(),
        expected_output: "A markdown-formatted list of 3-5 restaurants with all required details \
                          (name, cuisine, rating, price, description)."
            .to_string(),
        context: vec![],
        tool_calls: vec![ToolCall {
            tool: ToolId::VenueSearch,
            input: "{user_preference}".to_string(),
        }],
    }];

    let mut analysis_context = vec!["research".to_string()];
    let mut generation_context = vec!["analysis".to_string()];

    if include_weather {
        agents.push(Agent {
            role: "Weather and Ambience Advisor".to_string(),
            goal: "Provide accurate, up-to-date weather insights for the dining location so \
                   guests can plan their experience."
                .to_string(),
            backstory: "A hospitality professional who monitors forecasts to ensure diners are \
                        prepared for patio seating, travel, and attire."
                .to_string(),
            tools: vec![ToolId::WeatherLookup],
        });

        tasks.push(Task {
            name: "weather".to_string(),
            agent: "Weather and Ambience Advisor".to_string(),
            description: "Using the weather briefing gathered for {location}, provide a concise \
                          summary of temperature, precipitation expectations, and any comfort \
                          considerations relevant to dining (e.g., patio suitability)."
                .to_string(),
            expected_output: "A short weather briefing for {location} including temperature, \
                              wind, precipitation chances, and guidance on how the conditions \
                              affect dining plans."
                .to_string(),
            context: vec!["research".to_string()],
            tool_calls: vec![ToolCall {
                tool: ToolId::WeatherLookup,
                input: "{location}".to_string(),
            }],
        });

        analysis_context.push("weather".to_string());
        generation_context.push("weather".to_string());
    }

    tasks.push(Task {
        name: "analysis".to_string(),
        agent: "Dining Experience Analyst".to_string(),
        description: "Review the list of restaurants provided by the researcher, considering \
                      dietary restrictions ({dietary_restrictions}), desired ambiance \
                      ({ambiance_preference}), peak dining hours, and any weather \
                      considerations. For each restaurant, analyze its key features and why it \
                      would fit the user. Identify the single best recommendation."
            .to_string(),
        expected_output: "A detailed analysis of the top 3-5 restaurants, referencing any \
                          relevant weather considerations when applicable, and concluding with a \
                          clear identification of the single best recommendation and the reasons \
                          why."
            .to_string(),
        context: analysis_context,
        tool_calls: vec![
            ToolCall {
                tool: ToolId::DietaryFilter,
                input: "{dietary_restrictions}".to_string(),
            },
            ToolCall {
                tool: ToolId::Ambiance,
                input: "{ambiance_preference}".to_string(),
            },
            ToolCall {
                tool: ToolId::PeakTimes,
                input: "{location}".to_string(),
            },
        ],
    });

    tasks.push(Task {
        name: "generation".to_string(),
        agent: "Personalized Recommendation Generator".to_string(),
        description: "Based on the analysis, write a final, engaging, and personalized \
                      recommendation. The output should be a single, well-structured markdown \
                      response that presents the best restaurant and a brief mention of the \
                      runner-up options."
            .to_string(),
        expected_output: "A final, personalized restaurant recommendation in a friendly, \
                          professional tone, formatted in markdown, and including actionable \
                          weather insights when they are available."
            .to_string(),
        context: generation_context,
        tool_calls: vec![],
    });

    Crew::new(agents, tasks, Process::Sequential).expect("standard crew wiring is valid")
}
