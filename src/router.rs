use regex::Regex;

type ParamsConverter<T> = dyn Fn(Vec<&str>) -> Option<T> + Send + Sync;

/// Matches request paths against regex patterns, first match wins.
pub struct RouteParser<T> {
    routes: Vec<(Regex, Box<ParamsConverter<T>>)>,
}

impl<T> Default for RouteParser<T> {
    fn default() -> Self {
        Self { routes: Vec::new() }
    }
}

impl<T> RouteParser<T> {
    /// Adds a route without captured parameters.
    pub fn add_route<F>(&mut self, pattern: &str, f: F)
    where
        F: Fn() -> T + Send + Sync + 'static,
    {
        self.add_route_with_params(pattern, move |_| Some(f()));
    }

    /// Adds a route whose captured groups are handed to `converter` in order.
    /// The converter may reject the match by returning `None`.
    ///
    /// Panics if the pattern is not a valid regex.
    pub fn add_route_with_params<F>(&mut self, pattern: &str, converter: F)
    where
        F: Fn(Vec<&str>) -> Option<T> + Send + Sync + 'static,
    {
        let regex = Regex::new(pattern).unwrap_or_else(|e| panic!("Invalid route pattern {}: {}", pattern, e));
        self.routes.push((regex, Box::new(converter)));
    }

    pub fn test(&self, path: &str) -> Option<T> {
        self.routes.iter().find_map(|(regex, converter)| {
            regex.captures(path).and_then(|captures| {
                let params = captures
                    .iter()
                    .skip(1)
                    .filter_map(|m| m.map(|m| m.as_str()))
                    .collect::<Vec<_>>();
                converter(params)
            })
        })
    }
}
